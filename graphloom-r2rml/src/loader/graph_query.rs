//! Read-only lookups over a mapping graph.
//!
//! The extractor never walks the RDF store directly; it goes through this
//! adapter, which turns "property not present" into `None` so classification
//! by elimination stays a plain chain of lookups.

use oxrdf::{Graph, NamedNodeRef, SubjectRef, TermRef};

pub(crate) struct GraphQuery<'a> {
    graph: &'a Graph,
}

impl<'a> GraphQuery<'a> {
    pub(crate) fn new(graph: &'a Graph) -> Self {
        GraphQuery { graph }
    }

    /// One object of `(subject, property)`, if any triple matches.
    pub(crate) fn object(
        &self,
        subject: SubjectRef<'a>,
        property: NamedNodeRef<'static>,
    ) -> Option<TermRef<'a>> {
        let graph: &'a Graph = self.graph;
        graph.object_for_subject_predicate(subject, property)
    }

    /// All objects of `(subject, property)`, in term order.
    pub(crate) fn objects(
        &self,
        subject: SubjectRef<'a>,
        property: NamedNodeRef<'static>,
    ) -> impl Iterator<Item = TermRef<'a>> + 'a {
        let graph: &'a Graph = self.graph;
        graph
            .iter()
            .filter(move |t| t.subject == subject && t.predicate == property)
            .map(|t| t.object)
    }

    /// Every subject carrying the property. May repeat a subject when it
    /// carries the property more than once.
    pub(crate) fn subjects_with(
        &self,
        property: NamedNodeRef<'static>,
    ) -> impl Iterator<Item = SubjectRef<'a>> + 'a {
        let graph: &'a Graph = self.graph;
        graph
            .iter()
            .filter(move |t| t.predicate == property)
            .map(|t| t.subject)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vocab::R2RML;
    use oxrdf::{Literal, NamedNode, Triple};

    fn graph() -> Graph {
        let mut g = Graph::new();
        g.insert(&Triple::new(
            NamedNode::new("http://example.com/#EmpMapping").unwrap(),
            NamedNode::new(R2RML::TABLE_NAME.as_str()).unwrap(),
            Literal::new_simple_literal("EMP"),
        ));
        g
    }

    #[test]
    fn test_object_returns_none_for_absent_property() {
        let g = graph();
        let query = GraphQuery::new(&g);
        let subject = NamedNode::new("http://example.com/#EmpMapping").unwrap();
        assert!(query
            .object(subject.as_ref().into(), R2RML::TABLE_NAME)
            .is_some());
        assert!(query
            .object(subject.as_ref().into(), R2RML::SQL_QUERY)
            .is_none());
    }

    #[test]
    fn test_subjects_with_finds_carriers() {
        let g = graph();
        let query = GraphQuery::new(&g);
        assert_eq!(query.subjects_with(R2RML::TABLE_NAME).count(), 1);
        assert_eq!(query.subjects_with(R2RML::LOGICAL_TABLE).count(), 0);
    }
}
