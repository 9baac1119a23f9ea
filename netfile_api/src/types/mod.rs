mod de;

mod meta;
pub use self::meta::Page;

mod filing;
pub use self::filing::{Filing, FilerMeta, FilingMeta, SpecificationRef};

mod element;
pub use self::element::{
    Address, ElementClassification, FilingElement, RawTransactionPayload, TransactionModel,
    UnitemizedModel,
};

mod filer;
pub use self::filer::{ElectionInfluence, Filer, InfluenceCandidate, Seat};
