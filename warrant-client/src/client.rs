//! One configured handle over every remote surface.

use crate::config::ClientConfig;
use crate::engine::FilterEngine;
use crate::error::ClientResult;
use crate::groups::AbstractGroupClient;
use crate::policy::PolicyClient;
use crate::rest::RestClient;

#[derive(Clone)]
pub struct WarrantClient {
    filters: FilterEngine,
    policies: PolicyClient,
    groups: AbstractGroupClient,
}

impl WarrantClient {
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let rest = RestClient::new(config)?;
        Ok(Self {
            filters: FilterEngine::new(rest.clone(), config.max_page_size),
            policies: PolicyClient::new(rest.clone()),
            groups: AbstractGroupClient::new(rest),
        })
    }

    pub fn filters(&self) -> &FilterEngine {
        &self.filters
    }

    pub fn policies(&self) -> &PolicyClient {
        &self.policies
    }

    pub fn groups(&self) -> &AbstractGroupClient {
        &self.groups
    }
}
