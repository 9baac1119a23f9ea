use url::Url;

use crate::client::Endpoint;

use super::common::{Query, QueryCommon};

/// Query for `/filer/v101/filers`.
#[derive(Clone, Debug, Default)]
pub struct FilerQuery {
    pub common: QueryCommon,
    pub filer_nid: Option<String>,
}

impl Query for FilerQuery {
    const ENDPOINT: Endpoint = Endpoint::Filers;
    const PARENT_PARAM: &'static str = "filerNid";

    fn get_common(&mut self) -> &mut QueryCommon {
        &mut self.common
    }

    fn common(&self) -> &QueryCommon {
        &self.common
    }

    fn with_parent_id(mut self, parent_id: &str) -> Self {
        self.filer_nid = Some(parent_id.to_string());
        self
    }

    fn add_to_url(&self, url: &Url) -> Url {
        let mut url = self.common.add_to_url(url);
        if let Some(filer_nid) = &self.filer_nid {
            url.query_pairs_mut()
                .append_pair(Self::PARENT_PARAM, filer_nid);
        }
        url
    }
}
