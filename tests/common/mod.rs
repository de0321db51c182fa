// tests/common/mod.rs
// Scripted providers and a recording observer shared by integration tests.
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use product_lookup::{
    LookupEvent, LookupObserver, NormalizedBarcode, ProductProvider, ProductRecord, ProductSource,
    ProviderError,
};

#[derive(Clone)]
pub enum Outcome {
    Found(&'static str),
    Miss,
    Fail,
    Hang,
}

pub struct ScriptedProvider {
    pub name: &'static str,
    pub source: ProductSource,
    pub outcome: Outcome,
    pub calls: Arc<AtomicUsize>,
}

impl ScriptedProvider {
    pub fn new(name: &'static str, source: ProductSource, outcome: Outcome) -> Self {
        Self {
            name,
            source,
            outcome,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl ProductProvider for ScriptedProvider {
    async fn lookup(&self, barcode: &NormalizedBarcode) -> Result<ProductRecord, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.outcome {
            Outcome::Found(name) => {
                let mut rec = ProductRecord::found(self.source, barcode);
                rec.name = name.to_string();
                Ok(rec)
            }
            Outcome::Miss => Ok(ProductRecord::not_found(self.source, barcode)),
            Outcome::Fail => Err(ProviderError::MissingCredential {
                provider: self.name,
            }),
            Outcome::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(ProductRecord::not_found(self.source, barcode))
            }
        }
    }

    fn name(&self) -> &'static str {
        self.name
    }

    fn source(&self) -> ProductSource {
        self.source
    }

    fn is_configured(&self) -> bool {
        !matches!(self.outcome, Outcome::Fail)
    }
}

const CHAIN: [(&str, ProductSource); 5] = [
    ("A", ProductSource::BarcodeLookup),
    ("B", ProductSource::OpenFoodFacts),
    ("C", ProductSource::EanSearch),
    ("D", ProductSource::BarcodeSpider),
    ("E", ProductSource::UpcDatabase),
];

/// Five providers A..E with the given outcomes, plus typed handles for call counts.
pub fn chain(outcomes: [Outcome; 5]) -> (Vec<Arc<ScriptedProvider>>, Vec<Arc<dyn ProductProvider>>) {
    let scripted: Vec<Arc<ScriptedProvider>> = CHAIN
        .iter()
        .zip(outcomes)
        .map(|((name, source), outcome)| Arc::new(ScriptedProvider::new(*name, *source, outcome)))
        .collect();
    let dyn_list = scripted
        .iter()
        .map(|p| p.clone() as Arc<dyn ProductProvider>)
        .collect();
    (scripted, dyn_list)
}

#[derive(Default)]
pub struct RecordingObserver {
    pub events: Mutex<Vec<LookupEvent>>,
}

impl LookupObserver for RecordingObserver {
    fn on_event(&self, event: &LookupEvent) {
        self.events.lock().push(event.clone());
    }
}

impl RecordingObserver {
    pub fn snapshot(&self) -> Vec<LookupEvent> {
        self.events.lock().clone()
    }
}
