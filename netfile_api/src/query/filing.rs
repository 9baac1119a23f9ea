use url::Url;

use crate::client::Endpoint;

use super::common::{Query, QueryCommon};

/// Query for `/filing/v101/filings`.
#[derive(Clone, Debug, Default)]
pub struct FilingQuery {
    pub common: QueryCommon,
    pub filer_nid: Option<String>,
    pub application: Option<String>,
}

impl Query for FilingQuery {
    const ENDPOINT: Endpoint = Endpoint::Filings;
    const PARENT_PARAM: &'static str = "filerNid";

    fn get_common(&mut self) -> &mut QueryCommon {
        &mut self.common
    }

    fn common(&self) -> &QueryCommon {
        &self.common
    }

    fn with_parent_id(self, parent_id: &str) -> Self {
        self.with_filer_nid(parent_id)
    }

    fn add_to_url(&self, url: &Url) -> Url {
        let mut url = self.common.add_to_url(url);
        if let Some(filer_nid) = &self.filer_nid {
            url.query_pairs_mut()
                .append_pair(Self::PARENT_PARAM, filer_nid);
        }
        if let Some(application) = &self.application {
            url.query_pairs_mut()
                .append_pair("application", application);
        }
        url
    }
}

impl FilingQuery {
    pub fn with_filer_nid(mut self, filer_nid: &str) -> Self {
        self.filer_nid = Some(filer_nid.to_string());
        self
    }

    /// Restricts filings to one filing application (e.g. `Campaign`).
    pub fn with_application(mut self, application: &str) -> Self {
        self.application = Some(application.to_string());
        self
    }
}
