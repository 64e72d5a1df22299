use anyhow::Result;
use clap::Parser;
use emotion_api::{config::Config, web::serve};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "emotion-api")]
#[command(about = "Facial emotion recognition over HTTP")]
struct Args {
    /// 服务器绑定地址
    #[arg(long, default_value = "127.0.0.1:5000")]
    bind: String,

    /// ONNX模型文件
    #[arg(long, default_value = "models/emotion.onnx")]
    model: String,

    /// 日志级别
    #[arg(long, default_value = "info")]
    log_level: String,

    /// ONNX Runtime算子内线程数（默认：75%的CPU核心）
    #[arg(long)]
    intra_threads: Option<usize>,

    /// 最大请求体大小（字节）
    #[arg(long)]
    max_request_size: Option<usize>,

    /// 对模型原始分数做softmax
    #[arg(long)]
    softmax: bool,

    /// 缩放滤波器：nearest, triangle, catmullrom, gaussian, lanczos3
    #[arg(long, default_value = "triangle")]
    resize_filter: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // 初始化日志
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level)),
        )
        .with_target(false)
        .init();

    tracing::info!("Starting emotion recognition service...");
    tracing::info!("Bind address: {}", args.bind);
    tracing::info!("Model: {}", args.model);

    let config = Config::new(
        &args.bind,
        args.model,
        args.intra_threads,
        args.max_request_size,
        args.softmax,
        &args.resize_filter,
    )?;

    // 启动Web服务器
    serve(config).await?;

    Ok(())
}
