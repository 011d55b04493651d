//! Domain models for the directory.

pub mod page;
pub mod product;
pub mod unit;

pub use page::{OrderDirection, Page, DEFAULT_PAGE_SIZE};
pub use product::{NewProduct, Product, ProductOrder, ProductPatch, ProductQuery};
pub use unit::{NewUnit, SupplierPatch, Unit, UnitOrder, UnitPatch, UnitQuery};
