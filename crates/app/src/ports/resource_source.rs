//! Resource source port — where pages of users and résumés come from.

use std::future::Future;

use hunterdash_domain::error::DashError;
use hunterdash_domain::query::Query;
use hunterdash_domain::resource::{Page, Resource};

/// Lists pages of a resource collection from the backend.
pub trait ResourceSource {
    /// Fetch the page of `R` matching `query`.
    ///
    /// An empty query asks for the backend's default, unfiltered page.
    fn fetch_page<R: Resource>(
        &self,
        query: &Query,
    ) -> impl Future<Output = Result<Page<R>, DashError>> + Send;
}

impl<T: ResourceSource + Send + Sync> ResourceSource for std::sync::Arc<T> {
    fn fetch_page<R: Resource>(
        &self,
        query: &Query,
    ) -> impl Future<Output = Result<Page<R>, DashError>> + Send {
        (**self).fetch_page::<R>(query)
    }
}
