//! 手动测试客户端：上传一张图片并打印响应

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "emotion-client")]
#[command(about = "Send one image to the emotion recognition service")]
struct Args {
    /// 要上传的图片文件
    #[arg(default_value = "testimg3.jpg")]
    image: PathBuf,

    /// 预测接口地址
    #[arg(long, default_value = "http://127.0.0.1:5000/predict")]
    url: String,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let form = reqwest::blocking::multipart::Form::new()
        .file("image", &args.image)
        .with_context(|| format!("Failed to open {}", args.image.display()))?;

    let response: serde_json::Value = reqwest::blocking::Client::new()
        .post(&args.url)
        .multipart(form)
        .send()
        .with_context(|| format!("Request to {} failed", args.url))?
        .json()
        .context("Response was not JSON")?;

    println!("{}", response);

    Ok(())
}
