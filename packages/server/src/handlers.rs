//! HTTP handler functions for the mobility map API.

use actix_web::{HttpResponse, web};
use mobility_map_census::CensusError;
use mobility_map_geography_models::Geoid;
use mobility_map_pipeline::PipelineError;
use mobility_map_server_models::{ApiHealth, ApiTractCollection, TractQueryParams};

use crate::AppState;

/// `GET /api/health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `GET /api/tracts`
///
/// Returns the merged tract feature collection. `?all=true` disables the
/// county and water filters and returns every tract the winning source
/// supplied.
pub async fn tracts(
    state: web::Data<AppState>,
    params: web::Query<TractQueryParams>,
) -> HttpResponse {
    let verbatim = params.all.unwrap_or(false);
    let mut options = state.pipeline.resolve_options(verbatim);

    if let Some(counties) = params.counties.as_deref() {
        let counties: Vec<String> = counties
            .split(',')
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(ToString::to_string)
            .collect();
        if !counties.is_empty() {
            options.counties = counties;
        }
    }

    match state.pipeline.load(&options).await {
        Ok(outcome) => {
            HttpResponse::Ok().json(ApiTractCollection::new(outcome.features, outcome.synthetic))
        }
        Err(PipelineError::Superseded) => HttpResponse::Conflict().json(serde_json::json!({
            "error": "Load superseded by a newer request"
        })),
        Err(PipelineError::NoData) => HttpResponse::ServiceUnavailable().json(serde_json::json!({
            "error": "No boundary or statistic data could be loaded"
        })),
        Err(e) => {
            log::error!("Failed to load tracts: {e}");
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Failed to load tracts"
            }))
        }
    }
}

/// `GET /api/tracts/{geoid}`
///
/// Returns one tract's statistics for the inspector panel.
pub async fn tract_detail(state: web::Data<AppState>, path: web::Path<String>) -> HttpResponse {
    let Some(geoid) = Geoid::normalize(&path.into_inner()) else {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "error": "Invalid GEOID"
        }));
    };

    match state.pipeline.tract_detail(&geoid).await {
        Ok(record) => HttpResponse::Ok().json(record),
        Err(PipelineError::Census(e @ CensusError::TractNotFound { .. })) => {
            HttpResponse::NotFound().json(serde_json::json!({
                "error": e.to_string()
            }))
        }
        Err(e) => {
            log::error!("Failed to fetch tract {geoid}: {e}");
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Failed to fetch tract detail"
            }))
        }
    }
}
