//! Well-known vocabulary used by the correlation pipeline.

use crate::term::Iri;

/// `rdf:` namespace.
pub const RDF: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
/// `owl:` namespace.
pub const OWL: &str = "http://www.w3.org/2002/07/owl#";
/// `spindle:` namespace.
pub const SPINDLE: &str = "http://bbcarchdev.github.io/ns/spindle#";
/// `cc:` (Creative Commons) namespace.
pub const CC: &str = "http://creativecommons.org/ns#";
/// `doap:` namespace.
pub const DOAP: &str = "http://usefulinc.com/ns/doap#";
/// `dct:` (Dublin Core terms) namespace.
pub const DCT: &str = "http://purl.org/dc/terms/";

/// `rdf:type`, the "is-a" relation.
pub const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
/// `owl:sameAs`, the "equivalent-to" relation.
pub const OWL_SAME_AS: &str = "http://www.w3.org/2002/07/owl#sameAs";
/// `spindle:expressedAs`, the rulebase "expressed-as" relation.
pub const SPINDLE_EXPRESSED_AS: &str = "http://bbcarchdev.github.io/ns/spindle#expressedAs";

/// `cc:license`.
pub const CC_LICENSE: &str = "http://creativecommons.org/ns#license";
/// `doap:license`.
pub const DOAP_LICENSE: &str = "http://usefulinc.com/ns/doap#license";
/// `dct:license`.
pub const DCT_LICENSE: &str = "http://purl.org/dc/terms/license";

/// Predicates that count as a license assertion.
pub const LICENSE_PREDICATES: [&str; 3] = [CC_LICENSE, DOAP_LICENSE, DCT_LICENSE];

/// `rdf:type` as an [`Iri`].
#[must_use]
pub fn rdf_type() -> Iri {
    Iri::new(RDF_TYPE)
}

/// `owl:sameAs` as an [`Iri`].
#[must_use]
pub fn owl_same_as() -> Iri {
    Iri::new(OWL_SAME_AS)
}

/// `spindle:expressedAs` as an [`Iri`].
#[must_use]
pub fn expressed_as() -> Iri {
    Iri::new(SPINDLE_EXPRESSED_AS)
}
