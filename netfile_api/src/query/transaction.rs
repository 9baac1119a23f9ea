use url::Url;

use crate::client::Endpoint;

use super::common::{Query, QueryCommon};

/// Query for `/cal/v101/transaction-elements`, the older per-filing
/// transaction route. Usually sent with `parts=All`.
#[derive(Clone, Debug, Default)]
pub struct TransactionQuery {
    pub common: QueryCommon,
    pub filing_nid: Option<String>,
}

impl Query for TransactionQuery {
    const ENDPOINT: Endpoint = Endpoint::TransactionElements;
    const PARENT_PARAM: &'static str = "filingNid";

    fn get_common(&mut self) -> &mut QueryCommon {
        &mut self.common
    }

    fn common(&self) -> &QueryCommon {
        &self.common
    }

    fn with_parent_id(mut self, parent_id: &str) -> Self {
        self.filing_nid = Some(parent_id.to_string());
        self
    }

    fn add_to_url(&self, url: &Url) -> Url {
        let mut url = self.common.add_to_url(url);
        if let Some(filing_nid) = &self.filing_nid {
            url.query_pairs_mut()
                .append_pair(Self::PARENT_PARAM, filing_nid);
        }
        url
    }
}
