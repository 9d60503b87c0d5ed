/// File server hit counter
///
/// The counter is an ordinary value created at startup and shared through
/// `web::Data`; the middleware and the admin handlers receive the same instance.

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    web, Error,
};
use futures::future::LocalBoxFuture;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Number of requests served under `/app`
#[derive(Debug, Default)]
pub struct FileserverHits(AtomicU64);

impl FileserverHits {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&self) -> u64 {
        self.0.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn load(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }

    pub fn reset(&self) {
        self.0.store(0, Ordering::Relaxed);
    }
}

/// Counts every request that reaches the wrapped service
pub struct HitCounter {
    hits: web::Data<FileserverHits>,
}

impl HitCounter {
    pub fn new(hits: web::Data<FileserverHits>) -> Self {
        Self { hits }
    }
}

impl<S, B> Transform<S, ServiceRequest> for HitCounter
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = HitCounterService<S>;
    type Future = std::future::Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        std::future::ready(Ok(HitCounterService {
            service: Rc::new(service),
            hits: self.hits.clone(),
        }))
    }
}

pub struct HitCounterService<S> {
    service: Rc<S>,
    hits: web::Data<FileserverHits>,
}

impl<S, B> Service<ServiceRequest> for HitCounterService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let hits = self.hits.increment();
        tracing::debug!(path = %req.path(), hits = hits, "File server hit");

        let service = self.service.clone();
        Box::pin(async move { service.call(req).await })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_increments_and_resets() {
        let hits = FileserverHits::new();
        assert_eq!(hits.increment(), 1);
        assert_eq!(hits.increment(), 2);
        assert_eq!(hits.load(), 2);

        hits.reset();
        assert_eq!(hits.load(), 0);
    }
}
