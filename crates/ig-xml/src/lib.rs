//! # ig-xml
//!
//! XML codec for the identity-governance object model.
//!
//! Objects are written the way the platform exports them: one element per
//! object named after its class, header scalars as attributes, references
//! as nested `<Reference class=".." id=".." name=".."/>` elements and
//! attribute bags as `<Attributes><Map><entry key=".." value=".."/>`.
//!
//! ```text
//! <Identity id="8a1f" name="alice" email="alice@example.com">
//!   <Manager>
//!     <Reference class="sailpoint.object.Identity" name="bob"/>
//!   </Manager>
//!   <Attributes>
//!     <Map>
//!       <entry key="department" value="Finance"/>
//!     </Map>
//!   </Attributes>
//! </Identity>
//! ```
//!
//! ## Components
//!
//! - [`XmlCodec`] - object-level encode/decode with [`XmlOptions`]
//! - [`Element`] - the element tree the codec maps through
//! - [`XmlEntity`] - per-entity field mapping

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod codec;
pub mod dom;
pub mod entity;
pub mod error;
pub mod value;

pub use codec::{from_xml, parse_objects, to_xml, XmlCodec, XmlOptions, WRAPPER_ELEMENT};
pub use dom::Element;
pub use entity::XmlEntity;
pub use error::{XmlError, XmlResult};
