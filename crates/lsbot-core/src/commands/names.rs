use std::collections::HashMap;

use tracing::debug;

use crate::{messaging::port::GatewayPort, store::Store, Result};

/// Resolves `users.id` row ids to `@name` for export files, fetching each user once.
pub(crate) struct NameResolver<'a> {
    store: &'a Store,
    gateway: &'a dyn GatewayPort,
    cache: HashMap<i64, String>,
}

impl<'a> NameResolver<'a> {
    pub(crate) fn new(store: &'a Store, gateway: &'a dyn GatewayPort) -> Self {
        Self {
            store,
            gateway,
            cache: HashMap::new(),
        }
    }

    /// Falls back to the raw mention when the platform lookup fails.
    pub(crate) async fn name(&mut self, row_id: i64) -> Result<String> {
        if let Some(n) = self.cache.get(&row_id) {
            return Ok(n.clone());
        }

        let user = self.store.find_user(row_id).await?;
        let name = match user.as_ref().and_then(|u| u.platform_id()) {
            Some(id) => match self.gateway.display_name(id).await {
                Ok(n) => format!("@{n}"),
                Err(e) => {
                    debug!(user = %id, error = %e, "display name lookup failed");
                    id.mention()
                }
            },
            None => format!("#{row_id}"),
        };

        self.cache.insert(row_id, name.clone());
        Ok(name)
    }
}
