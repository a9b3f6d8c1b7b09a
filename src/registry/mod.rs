//! 端点注册表：将 (service, endpoint) 映射到端点构造函数。
//!
//! Endpoint registry mapping a `(service, endpoint)` key to a constructor.
//!
//! Constructors are plain functions registered up front; resolving a key never
//! involves string-to-type lookups at runtime. Every constructor validates its
//! parameters and returns a boxed [`Endpoint`] that renders the request path.

pub mod wow;

use crate::{Error, Result};
use std::collections::HashMap;
use std::fmt;

/// Named request parameters (`itemId`, `realm`, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    values: HashMap<String, String>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.values.insert(key.into(), value.to_string());
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl ToString) {
        self.values.insert(key.into(), value.to_string());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Fetch every name in `keys`, or fail listing all of them.
    pub(crate) fn require<const N: usize>(
        &self,
        endpoint: &str,
        keys: [&str; N],
    ) -> Result<[&str; N]> {
        let mut found = [""; N];
        for (slot, key) in found.iter_mut().zip(keys.iter()) {
            match self.get(key) {
                Some(v) => *slot = v,
                None => return Err(Error::missing_parameter(endpoint, &keys)),
            }
        }
        Ok(found)
    }
}

impl<K, V> FromIterator<(K, V)> for Params
where
    K: Into<String>,
    V: ToString,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Params::new();
        for (k, v) in iter {
            params.insert(k, v);
        }
        params
    }
}

/// A resolved API endpoint.
pub trait Endpoint: fmt::Debug + Send + Sync {
    /// Path and query string, relative to the region host.
    fn path(&self) -> String;
}

pub type EndpointConstructor = fn(&Params) -> Result<Box<dyn Endpoint>>;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct EndpointKey {
    service: String,
    endpoint: String,
}

impl EndpointKey {
    fn new(service: &str, endpoint: &str) -> Self {
        Self {
            service: service.trim().trim_matches('/').to_ascii_lowercase(),
            endpoint: endpoint.trim().trim_matches('/').to_ascii_lowercase(),
        }
    }
}

/// Explicit `(service, endpoint)` → constructor table.
#[derive(Clone)]
pub struct EndpointRegistry {
    constructors: HashMap<EndpointKey, EndpointConstructor>,
}

impl EndpointRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self {
            constructors: HashMap::new(),
        }
    }

    /// Registry pre-populated with the built-in `wow` endpoints.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        wow::register(&mut registry);
        registry
    }

    /// Register (or replace) a constructor. Names are case-insensitive.
    pub fn register(&mut self, service: &str, endpoint: &str, constructor: EndpointConstructor) {
        self.constructors
            .insert(EndpointKey::new(service, endpoint), constructor);
    }

    pub fn contains(&self, service: &str, endpoint: &str) -> bool {
        self.constructors
            .contains_key(&EndpointKey::new(service, endpoint))
    }

    pub fn len(&self) -> usize {
        self.constructors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constructors.is_empty()
    }

    /// Registered keys as `service/endpoint`, sorted.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .constructors
            .keys()
            .map(|k| format!("{}/{}", k.service, k.endpoint))
            .collect();
        keys.sort();
        keys
    }

    pub fn resolve(
        &self,
        service: &str,
        endpoint: &str,
        params: &Params,
    ) -> Result<Box<dyn Endpoint>> {
        let constructor = self
            .constructors
            .get(&EndpointKey::new(service, endpoint))
            .ok_or_else(|| Error::EndpointResolution {
                service: service.to_string(),
                endpoint: endpoint.to_string(),
            })?;
        constructor(params)
    }
}

impl Default for EndpointRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl fmt::Debug for EndpointRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EndpointRegistry")
            .field("endpoints", &self.keys())
            .finish()
    }
}
