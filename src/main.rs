use anyhow::Result;
use bankstmt::{clean, config, extract, output};
use rfd::FileDialog;
use std::path::Path;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env).init();
    info!("startup");

    println!("招商银行 PDF 流水处理工具");

    // ─── 2) configuration, before any work ───────────────────────────
    let cfg = config::load(Path::new("config.toml"))?;
    let save_dir = &cfg.app.save_path;
    println!("文件存储路径: {}", save_dir.display());

    // ─── 3) pick the statement PDF ───────────────────────────────────
    let Some(pdf) = FileDialog::new().add_filter("PDF", &["pdf"]).pick_file() else {
        println!("未选择文件，已退出");
        return Ok(());
    };
    println!("文件路径: {}", pdf.display());

    // ─── 4) extract → clean → chart → spreadsheet ────────────────────
    println!("1/4 数据读取...");
    let extractor = extract::TabulaExtractor::from_env();
    let fragments = extract::extract_statement(&extractor, &pdf)?;

    println!("2/4 数据清洗...");
    let statement = clean::clean(fragments)?;

    println!("3/4 制作图表...");
    output::chart::write_chart(&statement, save_dir)?;

    println!("4/4 制作表格...");
    output::xlsx::write_xlsx(&statement, save_dir)?;

    println!("处理完成！");
    println!("文件已存储在: {}", save_dir.display());
    Ok(())
}
