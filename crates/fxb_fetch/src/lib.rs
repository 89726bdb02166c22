//! Backend fetch collaborator.
//!
//! The pipeline itself is synchronous and pure; this crate is the one
//! asynchronous boundary. It maps a module id to the upstream query
//! (business parameter + request body), posts it, and resolves the answer
//! through the defensive envelope logic in `fxb_adapter`. Failures are
//! surfaced opaquely to the caller; there is no retry here.

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use fxb_adapter::ApiResponse;
use fxb_fields::ModuleId;

/// Upstream request failure, handed to the caller for user-facing
/// messaging. The pipeline never sees it.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("upstream returned HTTP {0}")]
    Status(u16),
}

/// Body of the upstream query, serialized with the backend's field names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestBody {
    #[serde(rename = "nomeTabela")]
    pub table: String,
    #[serde(rename = "grids", skip_serializing_if = "Option::is_none")]
    pub grids: Option<String>,
}

/// The upstream query for one module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestPlan {
    /// Value of the `business` query-string parameter.
    pub business: &'static str,
    pub body: RequestBody,
}

/// Maps a module to its upstream query. Modules without a registered query
/// (custom [`ModuleId::Other`] ids) have no plan.
pub fn request_plan(module: &ModuleId) -> Option<RequestPlan> {
    let (business, table, grids) = match module {
        ModuleId::Reimbursement => ("Reembolso", "f_reemb_desp", Some("GDESPESA")),
        ModuleId::Trip => ("Viagem", "f_c_sol_viagens", Some("GRID_DESPESA")),
        ModuleId::VendorRegistration => ("CliFor", "f_c_cadastros_f", None),
        ModuleId::Invoice => ("NF", "f_p_rec_notafis", None),
        ModuleId::Other(_) => return None,
    };
    Some(RequestPlan {
        business,
        body: RequestBody {
            table: table.to_string(),
            grids: grids.map(str::to_string),
        },
    })
}

/// Fetches and resolves the process payload for one module.
///
/// Modules without an upstream query yield an empty-but-valid response.
/// Non-success statuses and transport errors are returned as-is.
pub async fn fetch_process_data(
    client: &reqwest::Client,
    base_url: &str,
    module: &ModuleId,
) -> Result<ApiResponse, FetchError> {
    let Some(plan) = request_plan(module) else {
        warn!(module = %module, "no upstream query registered, returning empty payload");
        return Ok(ApiResponse::empty());
    };

    let url = format!("{base_url}?business={}", plan.business);
    debug!(module = %module, url = %url, "fetching process data");

    let response = client.post(&url).json(&plan.body).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status(status.as_u16()));
    }

    let value: Value = response.json().await?;
    Ok(ApiResponse::from_value(value))
}
