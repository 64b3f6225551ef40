use utoipa::OpenApi;

#[allow(unused_imports)]
use crate::routes::analysis::{__path_get_analysis, get_analysis, AnalysisResponse};
#[allow(unused_imports)]
use crate::routes::applications::{
    __path_create_application, create_application, CreateApplicationRequest, CreateApplicationResponse,
};

#[derive(OpenApi)]
#[openapi(
    info(title = "Screening API", version = "1.0.0", description = "Automated screening interview orchestration"),
    paths(create_application, get_analysis),
    components(schemas(CreateApplicationRequest, CreateApplicationResponse, AnalysisResponse)),
    tags(
        (name = "applications", description = "Application creation"),
        (name = "analysis", description = "Analysis retrieval"),
    ),
)]
pub struct ApiDoc;

pub fn openapi() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}
