//! cache.rs
//!
//! Кеш отчётов скрейпа в памяти. Адаптеры источников кладут сюда уже
//! распарсенные отчёты, запрос статистики забирает только свежие (окно
//! свежести настраивается, по умолчанию 5 минут). Ядро сверки кеша не видит:
//! ему передаются уже отобранные отчёты.

use std::collections::{BTreeMap, HashMap};
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::info;

use crate::models::{Vendor, VendorReport};

struct CachedReport {
    report: VendorReport,
    fetched_at: Instant,
}

pub struct ScrapeCache {
    ttl: Duration,
    inner: RwLock<HashMap<String, HashMap<Vendor, CachedReport>>>,
}

impl ScrapeCache {
    pub fn new(ttl: Duration) -> Self {
        ScrapeCache {
            ttl,
            inner: RwLock::new(HashMap::new()),
        }
    }

    pub async fn put(&self, event_id: &str, vendor: Vendor, report: VendorReport) {
        let mut inner = self.inner.write().await;
        inner.entry(event_id.to_string()).or_default().insert(
            vendor,
            CachedReport {
                report,
                fetched_at: Instant::now(),
            },
        );
    }

    /// Свежие отчёты по событию. Протухший отчёт равен отсутствующему:
    /// источник считается недоступным, а не "всё продано".
    pub async fn fresh(&self, event_id: &str) -> BTreeMap<Vendor, VendorReport> {
        let inner = self.inner.read().await;
        let Some(per_vendor) = inner.get(event_id) else {
            return BTreeMap::new();
        };

        let mut result = BTreeMap::new();
        for (vendor, cached) in per_vendor {
            if cached.fetched_at.elapsed() <= self.ttl {
                result.insert(*vendor, cached.report.clone());
            }
        }
        result
    }

    pub async fn clear(&self, event_id: &str) {
        let mut inner = self.inner.write().await;
        if inner.remove(event_id).is_some() {
            info!("Cleared cached reports for event {}", event_id);
        }
    }
}
