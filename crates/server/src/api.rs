//! Routing for the packages API

use crate::http::{Method, Request, Response, StatusCode};
use fakedm_catalog::Catalog;
use fakedm_errors::{CatalogError, ServerError};
use fakedm_types::{ACCEPTED_BODY, INSTALLED_ONLY_PARAM, PACKAGE_LIST_PATH};
use tracing::error;

/// Request handler bound to a catalog
#[derive(Debug, Clone)]
pub struct PackageApi {
    catalog: Catalog,
}

impl PackageApi {
    #[must_use]
    pub fn new(catalog: Catalog) -> Self {
        Self { catalog }
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Produce the response for one request
    #[must_use]
    pub fn handle(&self, request: &Request) -> Response {
        let Some(id) = request.path.strip_prefix(PACKAGE_LIST_PATH) else {
            return unimplemented(request);
        };

        let result = match request.method {
            Method::Get if id.is_empty() => self.list(request),
            Method::Get => self.query(request, id),
            Method::Put => self.mutate(id, "PUT", Catalog::request_install),
            Method::Delete => self.mutate(id, "DELETE", Catalog::request_uninstall),
            Method::Other(_) => return unimplemented(request),
        };

        result.unwrap_or_else(|err| {
            error!(error = %err, path = %request.path, "failed to build response");
            Response::error(StatusCode::InternalServerError, err.to_string())
        })
    }

    fn list(&self, request: &Request) -> Result<Response, ServerError> {
        match self.catalog.list(installed_only(request)) {
            Ok(packages) => Response::json(StatusCode::Ok, &packages),
            Err(err) => Ok(catalog_failure(&err)),
        }
    }

    fn query(&self, request: &Request, id: &str) -> Result<Response, ServerError> {
        match self.catalog.query(id, installed_only(request)) {
            Ok(package) => Response::json(StatusCode::Ok, &package),
            Err(err) => Ok(catalog_failure(&err)),
        }
    }

    fn mutate<F>(&self, id: &str, verb: &str, apply: F) -> Result<Response, ServerError>
    where
        F: Fn(&Catalog, &str) -> Result<bool, CatalogError>,
    {
        if id.is_empty() {
            return Ok(Response::error(
                StatusCode::InternalServerError,
                format!("{verb} here makes no sense"),
            ));
        }

        if let Err(err) = apply(&self.catalog, id) {
            return Ok(catalog_failure(&err));
        }

        Response::json(StatusCode::Accepted, ACCEPTED_BODY)
    }
}

fn installed_only(request: &Request) -> bool {
    request.query_param(INSTALLED_ONLY_PARAM) == Some("true")
}

fn catalog_failure(err: &CatalogError) -> Response {
    match err {
        CatalogError::NotFound { .. } => Response::error(StatusCode::NotFound, err.to_string()),
        CatalogError::DuplicateId { .. } | CatalogError::Poisoned => {
            error!(error = %err, "catalog unavailable");
            Response::error(StatusCode::InternalServerError, err.to_string())
        }
    }
}

/// Anything outside the package prefix is a test-setup mistake
fn unimplemented(request: &Request) -> Response {
    error!(method = %request.method, path = %request.path, "no route for request");
    Response::error(
        StatusCode::NotImplemented,
        format!("{} {} is not implemented", request.method, request.path),
    )
}
