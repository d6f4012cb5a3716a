use leptos::prelude::*;

use crate::commands::{api_client, Api};
use crate::components::ModalNotifier;

/// Services every widget on the page shares
#[derive(Clone, Copy)]
pub struct AppContext {
    pub notifier: ModalNotifier,
    api: StoredValue<Api, LocalStorage>,
}

impl AppContext {
    pub fn new(api_url: &str) -> Self {
        Self {
            notifier: ModalNotifier::new(),
            api: StoredValue::new_local(api_client(api_url)),
        }
    }

    pub fn api(&self) -> Api {
        self.api.get_value()
    }
}
