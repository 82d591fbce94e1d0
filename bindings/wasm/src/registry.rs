use pymprims_endpoint::InstanceRegistry;
use wasm_bindgen::prelude::*;

use crate::error::to_js_error;
use crate::host::WebHost;
use crate::parent::{parent_config, PymParent};

/// Parents created by a discovery scan.
#[wasm_bindgen(js_name = InstanceRegistry)]
pub struct PymRegistry {
    inner: InstanceRegistry<WebHost>,
    host: WebHost,
}

#[wasm_bindgen(js_class = InstanceRegistry)]
impl PymRegistry {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Result<PymRegistry, JsError> {
        let host = WebHost::new().map_err(|err| to_js_error("host unavailable", err))?;
        Ok(Self {
            inner: InstanceRegistry::new(),
            host,
        })
    }

    /// Construct and track a parent.
    pub fn create(
        &self,
        container_id: &str,
        url: &str,
        config: Option<String>,
    ) -> Result<PymParent, JsError> {
        let config = parent_config(config.as_deref())?;
        let host = WebHost::new().map_err(|err| to_js_error("host unavailable", err))?;
        let shared = self
            .inner
            .create(host, container_id, url, config)
            .map_err(|err| to_js_error("parent construction failed", err))?;
        Ok(PymParent::attach(shared))
    }

    /// Drop tracked parents whose frame is gone. Returns how many were dropped.
    pub fn sweep(&self) -> usize {
        self.inner.sweep()
    }

    #[wasm_bindgen(getter)]
    pub fn length(&self) -> usize {
        self.inner.len()
    }

    #[wasm_bindgen(js_name = containerIds)]
    pub fn container_ids(&self) -> Vec<String> {
        self.inner.container_ids()
    }

    /// Dispatch `pym:pym-initialized` on the document.
    pub fn announce(&self) {
        self.inner.announce(&self.host);
    }
}
