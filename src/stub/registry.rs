use std::{collections::BTreeMap, sync::Arc};

use log::info;

use super::{ServiceStubs, StubGenerator};
use crate::{
    contract::{ContractError, ServiceContract},
    service::WebServiceClient,
};

/// Generated stubs of every registered service, built once at startup.
#[derive(Default)]
pub struct ClientRegistry {
    clients: BTreeMap<String, Arc<ServiceStubs>>,
}

impl ClientRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generates stubs for `contract`; a service can only be registered once.
    pub fn register(
        &mut self,
        contract: ServiceContract,
        client: WebServiceClient,
    ) -> Result<Arc<ServiceStubs>, ContractError> {
        let service = contract.name().to_string();
        if self.clients.contains_key(&service) {
            return Err(ContractError::ServiceAlreadyRegistered(service));
        }

        let stubs = Arc::new(StubGenerator::new(contract).build(client)?);
        info!(
            service = service.as_str(),
            service_url:% = stubs.client().base_url();
            "Registered web service client"
        );
        self.clients.insert(service, stubs.clone());
        Ok(stubs)
    }

    pub fn get(&self, service: &str) -> Option<Arc<ServiceStubs>> {
        self.clients.get(service).cloned()
    }

    pub fn services(&self) -> impl Iterator<Item = &str> {
        self.clients.keys().map(String::as_str)
    }
}
