use crate::routes::{analysis, documents, health, tasks};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(info(
    title = "docr-server",
    description = "Document OCR service API",
    version = "0.1.0",
    contact(name = "docr-rs", url = "https://github.com/docr-rs/docr")
))]
pub struct ApiDoc;

pub fn get_docs() -> utoipa::openapi::OpenApi {
    let mut root = ApiDoc::openapi();
    root.merge(health::HealthApi::openapi());
    root.merge(documents::DocumentsApi::openapi());
    root.merge(analysis::AnalysisApi::openapi());
    root.merge(tasks::TasksApi::openapi());
    root
}
