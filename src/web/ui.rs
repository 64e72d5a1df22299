use axum::response::Html;

/// 首页处理器：单文件上传页面，调用 /predict
pub async fn index_handler() -> Html<&'static str> {
    Html(include_str!("../../templates/index.html"))
}
