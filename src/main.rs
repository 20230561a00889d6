// ==========================================
// 冷弯成型车间排产系统 - 命令行入口
// ==========================================
// 用法:
//   roll-forming-aps <订单簿.csv> [车间配置.json] [日志导出.csv]
//
// 配置缺省时使用内置车间参数; 第三个参数给出时导出生产日志 CSV。
// 日志级别通过 RUST_LOG 控制 (默认 info)。
// ==========================================

use anyhow::{bail, Context};
use tracing::{info, warn};

use roll_forming_aps::config::PlantConfig;
use roll_forming_aps::engine::Dispatcher;
use roll_forming_aps::importer::OrderImporter;
use roll_forming_aps::report::ReportRenderer;
use roll_forming_aps::{logging, APP_NAME, VERSION};

fn main() -> anyhow::Result<()> {
    logging::init();
    info!(version = VERSION, "{} 启动", APP_NAME);

    let mut args = std::env::args().skip(1);
    let orders_path = match args.next() {
        Some(p) => p,
        None => {
            eprintln!("用法: roll-forming-aps <订单簿.csv> [车间配置.json] [日志导出.csv]");
            std::process::exit(2);
        }
    };
    let config_path = args.next();
    let export_path = args.next();

    // 车间配置: 文件给出则读取校验, 否则使用内置缺省
    let config = match &config_path {
        Some(path) => PlantConfig::from_json_file(path)
            .with_context(|| format!("读取车间配置失败: {}", path))?,
        None => PlantConfig::default(),
    };
    config.validate().context("车间配置校验失败")?;
    info!(
        machines = config.machines.len(),
        operator_pool = config.operator_pool,
        work_minutes_per_day = config.work_minutes_per_day,
        start_date = %config.start_date,
        "车间配置就绪"
    );

    // 订单簿导入: 行级缺陷记入拒绝清单, 不中断
    let import_report = OrderImporter::new()
        .import_file(&orders_path)
        .with_context(|| format!("导入订单簿失败: {}", orders_path))?;
    for reject in &import_report.rejected {
        warn!(
            row = reject.row_number,
            field = %reject.field,
            "订单行被拒绝: {}",
            reject.message
        );
    }
    if import_report.orders.is_empty() && !import_report.rejected.is_empty() {
        bail!("订单簿无合格订单 (拒绝 {} 行)", import_report.rejected_count());
    }

    // 分派运行
    let dispatcher = Dispatcher::new(&config);
    let run = dispatcher
        .run(import_report.orders)
        .context("分派运行失败")?;

    // 报表输出
    let renderer = ReportRenderer::new();
    print!("{}", renderer.render_text(&run));
    if !import_report.rejected.is_empty() {
        println!("----- 导入拒绝行 -----");
        for reject in &import_report.rejected {
            println!(
                "第 {} 行 [{}]: {}",
                reject.row_number, reject.field, reject.message
            );
        }
        println!();
    }
    if let Some(path) = export_path {
        renderer
            .write_log_csv_file(&run, &path)
            .with_context(|| format!("导出生产日志失败: {}", path))?;
        println!("生产日志已导出: {}", path);
    }

    Ok(())
}
