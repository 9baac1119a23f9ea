use url::Url;

use crate::client::Endpoint;

use super::common::{Query, QueryCommon};

/// Query for `/filing/v101/filing-elements`.
#[derive(Clone, Debug, Default)]
pub struct FilingElementQuery {
    pub common: QueryCommon,
    pub filing_nid: Option<String>,
    pub element_classification: Option<String>,
}

impl Query for FilingElementQuery {
    const ENDPOINT: Endpoint = Endpoint::FilingElements;
    const PARENT_PARAM: &'static str = "filingNid";

    fn get_common(&mut self) -> &mut QueryCommon {
        &mut self.common
    }

    fn common(&self) -> &QueryCommon {
        &self.common
    }

    fn with_parent_id(self, parent_id: &str) -> Self {
        self.with_filing_nid(parent_id)
    }

    fn add_to_url(&self, url: &Url) -> Url {
        let mut url = self.common.add_to_url(url);
        if let Some(filing_nid) = &self.filing_nid {
            url.query_pairs_mut()
                .append_pair(Self::PARENT_PARAM, filing_nid);
        }
        if let Some(classification) = &self.element_classification {
            url.query_pairs_mut()
                .append_pair("elementClassification", classification);
        }
        url
    }
}

impl FilingElementQuery {
    pub fn with_filing_nid(mut self, filing_nid: &str) -> Self {
        self.filing_nid = Some(filing_nid.to_string());
        self
    }

    pub fn with_element_classification(mut self, classification: &str) -> Self {
        self.element_classification = Some(classification.to_string());
        self
    }
}
