//! Extraction of triples maps from a mapping graph.
//!
//! Candidates are every subject carrying `rr:logicalTable`. Each candidate
//! resolves recursively: a referencing object map forces its parent to
//! resolve first, so by the time a rule completes, every rule it references
//! is already built. A registry of per-identifier states makes diamond
//! references resolve once and turns mutual references into a build failure
//! instead of unbounded recursion.

use std::collections::HashMap;

use oxrdf::vocab::xsd;
use oxrdf::{Graph, SubjectRef, TermRef};
use tracing::debug;

use super::graph_query::GraphQuery;
use crate::error::{R2rmlError, R2rmlResult};
use crate::mapping::{
    ConstantValue, JoinCondition, LogicalTable, ObjectMap, PredicateMap, PredicateObjectMap,
    RefObjectMap, RefPredicateObjectMap, SubjectMap, Template, TermMap, TermType, TriplesMap,
};
use crate::vocab::R2RML;

/// Resolution state of one candidate. A missing registry entry means the
/// candidate has not been visited yet.
enum ResolveState {
    /// Being built somewhere up the call stack; reaching this state again
    /// means the reference chain loops.
    InProgress,
    Done(TriplesMap),
}

/// The relation target a predicate-object map was classified into.
enum ObjectTarget {
    Direct(ObjectMap),
    Referencing(RefObjectMap),
}

/// Walks a mapping graph and builds the rule model.
pub struct MappingExtractor<'a> {
    graph: GraphQuery<'a>,
    resolved: HashMap<String, ResolveState>,
}

impl<'a> MappingExtractor<'a> {
    pub fn new(graph: &'a Graph) -> Self {
        MappingExtractor {
            graph: GraphQuery::new(graph),
            resolved: HashMap::new(),
        }
    }

    /// Extract every triples map in the graph, sorted by identifier.
    pub fn extract_all(mut self) -> R2rmlResult<Vec<TriplesMap>> {
        let mut candidates: Vec<(String, SubjectRef<'a>)> = self
            .graph
            .subjects_with(R2RML::LOGICAL_TABLE)
            .map(|subject| (subject_id(subject), subject))
            .collect();
        candidates.sort_by(|a, b| a.0.cmp(&b.0));
        candidates.dedup_by(|a, b| a.0 == b.0);
        debug!(candidates = candidates.len(), "resolving triples maps");

        for (id, subject) in &candidates {
            self.resolve(id, *subject)?;
        }

        let mut maps: Vec<TriplesMap> = self
            .resolved
            .into_values()
            .filter_map(|state| match state {
                ResolveState::Done(map) => Some(map),
                ResolveState::InProgress => None,
            })
            .collect();
        maps.sort_by(|a, b| a.iri().cmp(b.iri()));
        Ok(maps)
    }

    fn resolve(&mut self, id: &str, subject: SubjectRef<'a>) -> R2rmlResult<()> {
        match self.resolved.get(id) {
            Some(ResolveState::Done(_)) => return Ok(()),
            Some(ResolveState::InProgress) => {
                return Err(R2rmlError::CircularDependency(id.to_string()));
            }
            None => {}
        }
        self.resolved
            .insert(id.to_string(), ResolveState::InProgress);
        let map = self.extract_triples_map(id, subject)?;
        debug!(triples_map = id, "resolved triples map");
        self.resolved
            .insert(id.to_string(), ResolveState::Done(map));
        Ok(())
    }

    fn extract_triples_map(
        &mut self,
        id: &str,
        subject: SubjectRef<'a>,
    ) -> R2rmlResult<TriplesMap> {
        let logical_table = self.extract_logical_table(id, subject)?;
        let subject_map = self.extract_subject_map(id, subject)?;

        let mut direct = Vec::new();
        let mut referencing = Vec::new();
        for pom_term in self.graph.objects(subject, R2RML::PREDICATE_OBJECT_MAP) {
            let pom = term_as_subject(pom_term, "rr:predicateObjectMap")?;
            let predicate = self.extract_predicate_map(pom)?;
            match self.extract_object_target(id, &logical_table, pom)? {
                ObjectTarget::Direct(object) => {
                    direct.push(PredicateObjectMap::new(predicate, object));
                }
                ObjectTarget::Referencing(object) => {
                    referencing.push(RefPredicateObjectMap::new(predicate, object));
                }
            }
        }

        let mut map = TriplesMap::new(id, logical_table, subject_map);
        for pom in direct {
            map = map.with_predicate_object_map(pom);
        }
        for pom in referencing {
            map = map.with_ref_predicate_object_map(pom);
        }
        Ok(map)
    }

    fn extract_logical_table(
        &self,
        id: &str,
        subject: SubjectRef<'a>,
    ) -> R2rmlResult<LogicalTable> {
        let Some(node) = self.graph.object(subject, R2RML::LOGICAL_TABLE) else {
            return Err(R2rmlError::MissingLogicalTable(id.to_string()));
        };
        let node = term_as_subject(node, "rr:logicalTable")?;

        let mut table = if let Some(name) = self.graph.object(node, R2RML::TABLE_NAME) {
            LogicalTable::table_name(literal_text(name, "rr:tableName")?.trim())
        } else if let Some(query) = self.graph.object(node, R2RML::SQL_QUERY) {
            LogicalTable::query(literal_text(query, "rr:sqlQuery")?.trim())
        } else {
            return Err(R2rmlError::MissingLogicalTable(id.to_string()));
        };

        if let Some(version) = self.graph.object(node, R2RML::SQL_VERSION) {
            table = table.with_sql_version(term_text(version));
        }
        Ok(table)
    }

    fn extract_subject_map(&self, id: &str, subject: SubjectRef<'a>) -> R2rmlResult<SubjectMap> {
        // Constant shorthand: rr:subject <iri>
        if let Some(constant) = self.graph.object(subject, R2RML::SUBJECT) {
            let value = constant_from_term(constant, "rr:subject")?;
            return Ok(SubjectMap::new(TermMap::Constant(value)));
        }

        let Some(node) = self.graph.object(subject, R2RML::SUBJECT_MAP) else {
            return Err(R2rmlError::MissingSubjectMap(id.to_string()));
        };
        let node = term_as_subject(node, "rr:subjectMap")?;

        let term_map = self.classify_term_map(node)?;
        let mut subject_map = SubjectMap::new(term_map);
        if let Some(term_type) = self.extract_term_type(node)? {
            subject_map = subject_map.with_term_type(term_type);
        }
        for class in self.graph.objects(node, R2RML::CLASS) {
            subject_map = subject_map.with_class(iri_text(class, "rr:class")?);
        }
        Ok(subject_map)
    }

    fn extract_predicate_map(&self, pom: SubjectRef<'a>) -> R2rmlResult<PredicateMap> {
        // Constant shorthand: rr:predicate <iri>
        if let Some(constant) = self.graph.object(pom, R2RML::PREDICATE) {
            let value = constant_from_term(constant, "rr:predicate")?;
            return Ok(PredicateMap::new(TermMap::Constant(value)));
        }

        let Some(node) = self.graph.object(pom, R2RML::PREDICATE_MAP) else {
            return Err(R2rmlError::MissingPredicateMap(subject_id(pom)));
        };
        let node = term_as_subject(node, "rr:predicateMap")?;
        Ok(PredicateMap::new(self.classify_term_map(node)?))
    }

    fn extract_object_target(
        &mut self,
        id: &str,
        logical_table: &LogicalTable,
        pom: SubjectRef<'a>,
    ) -> R2rmlResult<ObjectTarget> {
        // Constant shorthand: rr:object <iri-or-literal>
        if let Some(constant) = self.graph.object(pom, R2RML::OBJECT) {
            let value = constant_from_term(constant, "rr:object")?;
            return Ok(ObjectTarget::Direct(ObjectMap::new(TermMap::Constant(
                value,
            ))));
        }

        let Some(node) = self.graph.object(pom, R2RML::OBJECT_MAP) else {
            return Err(R2rmlError::MissingObjectMap(subject_id(pom)));
        };
        let node = term_as_subject(node, "rr:objectMap")?;

        if let Some(parent) = self.graph.object(node, R2RML::PARENT_TRIPLES_MAP) {
            return self
                .extract_ref_object_map(id, logical_table, node, parent)
                .map(ObjectTarget::Referencing);
        }

        let term_map = self.classify_term_map(node)?;
        let mut object_map = ObjectMap::new(term_map);
        if let Some(term_type) = self.extract_term_type(node)? {
            object_map = object_map.with_term_type(term_type);
        }

        let datatype = self
            .graph
            .object(node, R2RML::DATATYPE)
            .map(|term| iri_text(term, "rr:datatype"))
            .transpose()?;
        let language = self
            .graph
            .object(node, R2RML::LANGUAGE)
            .map(|term| literal_text(term, "rr:language").map(str::to_string))
            .transpose()?;
        if datatype.is_some() && language.is_some() {
            return Err(R2rmlError::InvalidValue {
                property: "rr:datatype".to_string(),
                message: "an object map cannot carry both rr:datatype and rr:language".to_string(),
            });
        }
        if let Some(datatype) = datatype {
            object_map = object_map.with_datatype(datatype);
        }
        if let Some(language) = language {
            if language.trim().is_empty() {
                return Err(R2rmlError::InvalidValue {
                    property: "rr:language".to_string(),
                    message: "language tag is empty".to_string(),
                });
            }
            object_map = object_map.with_language(language);
        }
        Ok(ObjectTarget::Direct(object_map))
    }

    fn extract_ref_object_map(
        &mut self,
        id: &str,
        logical_table: &LogicalTable,
        node: SubjectRef<'a>,
        parent: TermRef<'a>,
    ) -> R2rmlResult<RefObjectMap> {
        let parent_subject = term_as_subject(parent, "rr:parentTriplesMap")?;
        let parent_id = subject_id(parent_subject);

        // A rule joining to itself is reported as such, not as a cycle.
        if parent_id == id {
            return Err(R2rmlError::SelfReferencingJoin(id.to_string()));
        }
        self.resolve(&parent_id, parent_subject)?;

        let mut conditions = Vec::new();
        for condition_term in self.graph.objects(node, R2RML::JOIN_CONDITION) {
            let condition = term_as_subject(condition_term, "rr:joinCondition")?;
            let child = self.require_column(condition, R2RML::CHILD, "rr:child")?;
            let parent_column = self.require_column(condition, R2RML::PARENT, "rr:parent")?;
            conditions.push(JoinCondition::new(child, parent_column));
        }

        let parent_table = match self.resolved.get(&parent_id) {
            Some(ResolveState::Done(map)) => map.logical_table().clone(),
            _ => return Err(R2rmlError::UnknownTriplesMap(parent_id)),
        };
        if conditions.is_empty() && parent_table != *logical_table {
            return Err(R2rmlError::MissingJoinCondition {
                child: id.to_string(),
                parent: parent_id,
            });
        }
        Ok(RefObjectMap::with_conditions(parent_id, conditions))
    }

    /// Classification by elimination: constant, then template, then column.
    fn classify_term_map(&self, node: SubjectRef<'a>) -> R2rmlResult<TermMap> {
        if let Some(constant) = self.graph.object(node, R2RML::CONSTANT) {
            return Ok(TermMap::Constant(constant_from_term(
                constant,
                "rr:constant",
            )?));
        }
        if let Some(template) = self.graph.object(node, R2RML::TEMPLATE) {
            let pattern = literal_text(template, "rr:template")?;
            return Ok(TermMap::Template(Template::parse(pattern)?));
        }
        if let Some(column) = self.graph.object(node, R2RML::COLUMN) {
            return Ok(TermMap::Column(
                literal_text(column, "rr:column")?.to_string(),
            ));
        }
        Err(R2rmlError::NotATermMap(subject_id(node)))
    }

    fn extract_term_type(&self, node: SubjectRef<'a>) -> R2rmlResult<Option<TermType>> {
        match self.graph.object(node, R2RML::TERM_TYPE) {
            None => Ok(None),
            Some(term) => {
                let iri = iri_text(term, "rr:termType")?;
                TermType::from_iri(&iri)
                    .map(Some)
                    .ok_or_else(|| R2rmlError::InvalidValue {
                        property: "rr:termType".to_string(),
                        message: format!("unrecognized term type {iri}"),
                    })
            }
        }
    }

    fn require_column(
        &self,
        condition: SubjectRef<'a>,
        property: oxrdf::NamedNodeRef<'static>,
        name: &str,
    ) -> R2rmlResult<String> {
        let Some(term) = self.graph.object(condition, property) else {
            return Err(R2rmlError::InvalidValue {
                property: "rr:joinCondition".to_string(),
                message: format!("missing {name}"),
            });
        };
        let column = literal_text(term, name)?;
        if column.trim().is_empty() {
            return Err(R2rmlError::InvalidValue {
                property: name.to_string(),
                message: "column name is empty".to_string(),
            });
        }
        Ok(column.to_string())
    }
}

/// Identifier of a mapping node: the IRI, or `_:label` for blank nodes.
fn subject_id(subject: SubjectRef<'_>) -> String {
    match subject {
        SubjectRef::NamedNode(node) => node.as_str().to_string(),
        SubjectRef::BlankNode(node) => format!("_:{}", node.as_str()),
    }
}

fn term_as_subject<'a>(term: TermRef<'a>, property: &str) -> R2rmlResult<SubjectRef<'a>> {
    match term {
        TermRef::NamedNode(node) => Ok(SubjectRef::NamedNode(node)),
        TermRef::BlankNode(node) => Ok(SubjectRef::BlankNode(node)),
        TermRef::Literal(_) => Err(R2rmlError::InvalidValue {
            property: property.to_string(),
            message: "expected a resource, found a literal".to_string(),
        }),
    }
}

fn literal_text<'a>(term: TermRef<'a>, property: &str) -> R2rmlResult<&'a str> {
    match term {
        TermRef::Literal(literal) => Ok(literal.value()),
        _ => Err(R2rmlError::InvalidValue {
            property: property.to_string(),
            message: "expected a literal".to_string(),
        }),
    }
}

fn iri_text(term: TermRef<'_>, property: &str) -> R2rmlResult<String> {
    match term {
        TermRef::NamedNode(node) => Ok(node.as_str().to_string()),
        _ => Err(R2rmlError::InvalidValue {
            property: property.to_string(),
            message: "expected an IRI".to_string(),
        }),
    }
}

/// Loose rendering used for annotation values such as `rr:sqlVersion`,
/// which the vocabulary allows as IRIs and practice sometimes writes as
/// literals.
fn term_text(term: TermRef<'_>) -> String {
    match term {
        TermRef::NamedNode(node) => node.as_str().to_string(),
        TermRef::BlankNode(node) => format!("_:{}", node.as_str()),
        TermRef::Literal(literal) => literal.value().to_string(),
    }
}

fn constant_from_term(term: TermRef<'_>, property: &str) -> R2rmlResult<ConstantValue> {
    match term {
        TermRef::NamedNode(node) => Ok(ConstantValue::Iri(node.as_str().to_string())),
        TermRef::Literal(literal) => {
            let language = literal.language().map(str::to_string);
            let datatype = if language.is_some() || literal.datatype() == xsd::STRING {
                None
            } else {
                Some(literal.datatype().as_str().to_string())
            };
            Ok(ConstantValue::Literal {
                value: literal.value().to_string(),
                datatype,
                language,
            })
        }
        TermRef::BlankNode(_) => Err(R2rmlError::InvalidValue {
            property: property.to_string(),
            message: "a constant cannot be a blank node".to_string(),
        }),
    }
}
