use super::engine::{PersistenceEngine, Row};
use super::mapping::map_row;
use crate::config::{FluentQueryConfig, TranslationConfig};
use crate::error::{FluentQueryError, Result};
use crate::logging::{log_error, log_execution};
use crate::metamodel::{AttributeResolver, Entity, EntityKey, EntityType, FieldValue};
use crate::naming::NamingConvention;
use crate::query_builder::{
    Comparison, Connective, InsertBuilder, InsertTree, Operand, Operator, Predicate, QueryBuilder,
    QueryTree,
};
use crate::translation::{SqlTranslator, TranslatedStatement};
use std::sync::Arc;
use std::time::Instant;
use tracing::warn;

/// Query, insert and row-mapping facade over one persistence engine
///
/// ```rust,ignore
/// let dao = Dao::new(MemoryEngine::new(), Arc::new(NamingConvention::new()));
/// dao.register(&[EntityType::of::<Customer>()])?;
///
/// let mut query = dao.query::<Customer>();
/// query.where_(|c| c.name)?.like("t%");
/// let customers: Vec<Customer> = dao.list(&query.build()?).await?;
/// ```
#[derive(Debug)]
pub struct Dao<P> {
    engine: P,
    convention: Arc<NamingConvention>,
    translation: TranslationConfig,
}

impl<P: PersistenceEngine> Dao<P> {
    pub fn new(engine: P, convention: Arc<NamingConvention>) -> Self {
        Self {
            engine,
            convention,
            translation: TranslationConfig::default(),
        }
    }

    pub fn from_config(engine: P, config: &FluentQueryConfig) -> Self {
        Self::new(engine, Arc::new(NamingConvention::from_config(&config.naming)))
            .with_translation(config.translation)
    }

    pub fn with_translation(mut self, translation: TranslationConfig) -> Self {
        self.translation = translation;
        self
    }

    pub fn engine(&self) -> &P {
        &self.engine
    }

    pub fn convention(&self) -> &Arc<NamingConvention> {
        &self.convention
    }

    /// Discovers mappings up front; sub-query entities must be registered
    pub fn register(&self, entity_types: &[EntityType]) -> Result<()> {
        self.convention.discover(entity_types)
    }

    pub fn query<E: Entity>(&self) -> QueryBuilder<E> {
        QueryBuilder::for_entity()
    }

    /// Translator honoring the engine's placeholder requirement
    pub fn translator(&self) -> SqlTranslator<'_> {
        let translator = SqlTranslator::from_config(&self.convention, &self.translation);
        match self.engine.placeholder_style() {
            Some(style) => translator
                .with_query_placeholders(style)
                .with_insert_placeholders(style),
            None => translator,
        }
    }

    pub fn translate(&self, tree: &QueryTree) -> Result<TranslatedStatement> {
        self.translator().translate(tree)
    }

    pub async fn fetch_rows(&self, tree: &QueryTree) -> Result<Vec<Row>> {
        let statement = self.translate(tree)?;
        self.fetch_statement(&statement).await
    }

    /// Runs the query and maps every row to `E`
    pub async fn list<E: Entity>(&self, tree: &QueryTree) -> Result<Vec<E>> {
        self.check_target::<E>(tree)?;
        self.convention.discover_entity::<E>()?;
        let rows = self.fetch_rows(tree).await?;
        rows.iter()
            .map(|row| map_row::<E>(row, &self.convention))
            .collect()
    }

    /// First mapped row, if any
    pub async fn single<E: Entity>(&self, tree: &QueryTree) -> Result<Option<E>> {
        Ok(self.list::<E>(tree).await?.into_iter().next())
    }

    /// Looks a record up by its single identity attribute
    pub async fn find_by_id<E: Entity, V: FieldValue>(&self, id: V) -> Result<Option<E>> {
        let mapping = self.convention.discover_entity::<E>()?;
        let mut identity = mapping.identity();
        let column = match (identity.next(), identity.next()) {
            (Some(column), None) => column,
            _ => {
                return Err(FluentQueryError::entity_definition(
                    E::NAME,
                    "lookup by id requires exactly one identity attribute",
                ))
            }
        };

        let attribute = AttributeResolver::resolve_name::<E>(column.attribute)?;
        if attribute.kind != V::kind() {
            return Err(FluentQueryError::unresolvable_attribute(
                E::NAME,
                attribute.name,
                format!("identity declared as {} but looked up as {}", attribute.kind, V::kind()),
            ));
        }

        let mut tree = QueryTree::new(EntityKey::of::<E>(), 0);
        tree.add_predicate(
            Connective::And,
            Predicate::Comparison(Comparison {
                attribute,
                operator: Operator::Eq,
                operand: Operand::Value(id.into_value()),
            }),
        )?;
        self.single::<E>(&tree).await
    }

    /// Inserts every non-null attribute of `record`
    pub async fn insert<E: Entity>(&self, record: &E) -> Result<u64> {
        self.convention.discover_entity::<E>()?;
        let tree = InsertBuilder::from_record(record)?.build()?;
        self.insert_tree(&tree).await
    }

    pub async fn insert_tree(&self, tree: &InsertTree) -> Result<u64> {
        let statement = self.translator().translate_insert(tree)?;
        let started = Instant::now();
        match self
            .engine
            .execute(&statement.text, &statement.positional)
            .await
        {
            Ok(affected) => {
                log_execution(
                    "insert",
                    &statement.text,
                    statement.parameter_count(),
                    "ok",
                    Some(elapsed_ms(started)),
                    Some(affected),
                );
                Ok(affected)
            }
            Err(source) => Err(self.execution_failed("insert", statement, source)),
        }
    }

    async fn fetch_statement(&self, statement: &TranslatedStatement) -> Result<Vec<Row>> {
        let started = Instant::now();
        match self
            .engine
            .fetch(&statement.text, &statement.positional)
            .await
        {
            Ok(rows) => {
                log_execution(
                    "select",
                    &statement.text,
                    statement.parameter_count(),
                    "ok",
                    Some(elapsed_ms(started)),
                    Some(rows.len() as u64),
                );
                Ok(rows)
            }
            Err(source) => Err(self.execution_failed("select", statement.clone(), source)),
        }
    }

    fn execution_failed(
        &self,
        operation: &str,
        statement: TranslatedStatement,
        source: crate::error::EngineError,
    ) -> FluentQueryError {
        warn!(
            operation = operation,
            statement = %statement.text,
            error = %source,
            "Persistence engine call failed"
        );
        let context = serde_json::to_string(&statement).unwrap_or_else(|_| statement.text.clone());
        log_error("dao", operation, &source.to_string(), Some(&context));
        FluentQueryError::execution(statement.text, statement.positional, source)
    }

    fn check_target<E: Entity>(&self, tree: &QueryTree) -> Result<()> {
        if tree.entity() != EntityKey::of::<E>() {
            return Err(FluentQueryError::invalid_structure(
                tree.entity().name,
                format!("query cannot be mapped to {}", E::NAME),
            ));
        }
        Ok(())
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}
