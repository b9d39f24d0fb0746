use std::fmt;

/// Backend services whose logs can be fetched, in the order they are queried.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Service {
    Pageserver,
    Safekeeper,
    Compute,
    ConnectionPooler,
    Proxy,
}

impl Service {
    pub const ALL: [Service; 5] = [
        Service::Pageserver,
        Service::Safekeeper,
        Service::Compute,
        Service::ConnectionPooler,
        Service::Proxy,
    ];

    /// Value of the service label in the log store.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Service::Pageserver => "pageserver",
            Service::Safekeeper => "safekeeper",
            Service::Compute => "compute",
            Service::ConnectionPooler => "connection-pooler",
            Service::Proxy => "proxy",
        }
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which services to fetch logs for.
///
/// The all-false default selects nothing here. Treating an empty selection as
/// "everything" is up to the caller, see [`LogSelection::or_all`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LogSelection {
    pub pageserver: bool,
    pub safekeeper: bool,
    pub compute: bool,
    pub connection_pooler: bool,
    pub proxy: bool,
}

impl LogSelection {
    pub const fn all() -> Self {
        LogSelection {
            pageserver: true,
            safekeeper: true,
            compute: true,
            connection_pooler: true,
            proxy: true,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.services().is_empty()
    }

    /// Selects every service when nothing was selected explicitly.
    pub fn or_all(self) -> Self {
        if self.is_empty() { Self::all() } else { self }
    }

    pub fn contains(&self, service: Service) -> bool {
        match service {
            Service::Pageserver => self.pageserver,
            Service::Safekeeper => self.safekeeper,
            Service::Compute => self.compute,
            Service::ConnectionPooler => self.connection_pooler,
            Service::Proxy => self.proxy,
        }
    }

    pub fn services(&self) -> Vec<Service> {
        Service::ALL
            .into_iter()
            .filter(|service| self.contains(*service))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_selects_nothing() {
        let selection = LogSelection::default();
        assert!(selection.is_empty());
        assert!(selection.services().is_empty());
    }

    #[test]
    fn or_all_expands_only_empty_selections() {
        assert_eq!(LogSelection::default().or_all(), LogSelection::all());

        let compute_only = LogSelection {
            compute: true,
            ..Default::default()
        };
        assert_eq!(compute_only.or_all(), compute_only);
    }

    #[test]
    fn services_keep_fixed_order() {
        let selection = LogSelection {
            proxy: true,
            pageserver: true,
            connection_pooler: true,
            ..Default::default()
        };
        assert_eq!(
            selection.services(),
            vec![Service::Pageserver, Service::ConnectionPooler, Service::Proxy]
        );
        assert_eq!(LogSelection::all().services(), Service::ALL.to_vec());
    }
}
