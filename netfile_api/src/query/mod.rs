mod common;
pub use self::common::{Query, QueryCommon, DEFAULT_LIMIT};

mod filing;
pub use self::filing::FilingQuery;

mod filing_element;
pub use self::filing_element::FilingElementQuery;

mod filer;
pub use self::filer::FilerQuery;

mod transaction;
pub use self::transaction::TransactionQuery;
