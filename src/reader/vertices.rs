use super::cache::{CacheSlot, ChunkCache};
use super::FilterMode;
use crate::config::ReaderConfig;
use crate::error::{GraphError, GraphResult};
use crate::expression::pushdown::ColumnBatch;
use crate::expression::{Expression, Row};
use crate::info::{GraphInfo, VertexInfo};
use crate::storage::arrow_convert::{flag_values, value_at};
use crate::storage::ChunkStore;
use crate::types::{chunk_count, chunk_len, FromValue, IdType, Value};
use arrow::array::{Array, ArrayRef};
use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tracing::debug;

/// All vertices of one type, optionally restricted to a sorted id selection
pub struct VerticesCollection {
    graph_info: Arc<GraphInfo>,
    vertex_info: Arc<VertexInfo>,
    store: ChunkStore,
    vertex_num: IdType,
    selection: Option<Arc<Vec<IdType>>>,
    filter_mode: FilterMode,
}

impl VerticesCollection {
    /// Every vertex of `vertex_type`
    ///
    /// # Returns
    /// * `Err(GraphError::UnknownType)` if the graph has no such vertex type
    pub fn make(graph_info: &Arc<GraphInfo>, vertex_type: &str) -> GraphResult<Self> {
        let vertex_info = graph_info
            .vertex_info(vertex_type)
            .cloned()
            .ok_or_else(|| GraphError::UnknownType(vertex_type.to_string()))?;
        let store = ChunkStore::for_graph(graph_info)?;
        let vertex_num = store.vertex_num(&vertex_info)?;
        debug!(vertex_type, vertex_num, "opened vertices collection");
        Ok(Self {
            graph_info: graph_info.clone(),
            vertex_info,
            store,
            vertex_num,
            selection: None,
            filter_mode: FilterMode::default(),
        })
    }

    pub fn from_config(
        graph_info: &Arc<GraphInfo>,
        vertex_type: &str,
        config: &ReaderConfig,
    ) -> GraphResult<Self> {
        Ok(Self::make(graph_info, vertex_type)?.with_filter_mode(config.filter_mode))
    }

    /// Vertices carrying every label in `labels`
    pub fn with_labels(
        graph_info: &Arc<GraphInfo>,
        vertex_type: &str,
        labels: &[String],
    ) -> GraphResult<Self> {
        let mut collection = Self::make(graph_info, vertex_type)?;
        let ids = collection.filter_by_labels(labels, None, None)?;
        collection.selection = Some(Arc::new(ids));
        Ok(collection)
    }

    pub fn with_label(graph_info: &Arc<GraphInfo>, vertex_type: &str, label: &str) -> GraphResult<Self> {
        Self::with_labels(graph_info, vertex_type, &[label.to_string()])
    }

    /// Vertices for which `expr` holds
    pub fn with_property_filter(
        graph_info: &Arc<GraphInfo>,
        vertex_type: &str,
        property: &str,
        expr: &Expression,
    ) -> GraphResult<Self> {
        let mut collection = Self::make(graph_info, vertex_type)?;
        let ids = collection.filter(property, expr, None, None)?;
        collection.selection = Some(Arc::new(ids));
        Ok(collection)
    }

    pub fn with_filter_mode(mut self, mode: FilterMode) -> Self {
        self.filter_mode = mode;
        self
    }

    pub fn filter_mode(&self) -> FilterMode {
        self.filter_mode
    }

    pub fn graph_info(&self) -> &Arc<GraphInfo> {
        &self.graph_info
    }

    pub fn vertex_info(&self) -> &Arc<VertexInfo> {
        &self.vertex_info
    }

    /// Vertices stored for the type, ignoring any selection
    pub fn vertex_num(&self) -> IdType {
        self.vertex_num
    }

    pub fn len(&self) -> usize {
        match &self.selection {
            Some(ids) => ids.len(),
            None => self.vertex_num as usize,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn begin(&self) -> VertexIter<'_> {
        VertexIter::new(self, 0)
    }

    pub fn end(&self) -> VertexIter<'_> {
        VertexIter::new(self, self.len())
    }

    /// Cursor at `id`, or `end()` if the collection does not hold it
    pub fn find(&self, id: IdType) -> VertexIter<'_> {
        let pos = match &self.selection {
            Some(ids) => ids.binary_search(&id).ok(),
            None if id >= 0 && id < self.vertex_num => Some(id as usize),
            None => None,
        };
        VertexIter::new(self, pos.unwrap_or_else(|| self.len()))
    }

    /// Ids in iteration order
    pub fn ids(&self) -> impl Iterator<Item = IdType> + '_ {
        (0..self.len()).map(move |pos| self.id_at(pos))
    }

    fn id_at(&self, pos: usize) -> IdType {
        match &self.selection {
            Some(ids) => ids[pos],
            None => pos as IdType,
        }
    }

    fn selects(&self, id: IdType) -> bool {
        match &self.selection {
            Some(ids) => ids.binary_search(&id).is_ok(),
            None => true,
        }
    }

    fn chunks_to_scan(&self, valid_chunks: Option<&[IdType]>) -> Vec<IdType> {
        let total = chunk_count(self.vertex_num, self.vertex_info.chunk_size());
        match valid_chunks {
            Some(chunks) => {
                let set: BTreeSet<IdType> = chunks
                    .iter()
                    .copied()
                    .filter(|c| *c >= 0 && *c < total)
                    .collect();
                set.into_iter().collect()
            }
            None => (0..total).collect(),
        }
    }

    /// Ids of vertices carrying all of `labels`
    ///
    /// An empty label list matches every vertex. Only `valid_chunks` are
    /// scanned when given; `new_valid_chunk` receives the chunks holding at
    /// least one match.
    ///
    /// # Returns
    /// * `Err(GraphError::InvalidArgument)` for a label the type does not declare
    pub fn filter_by_labels(
        &self,
        labels: &[String],
        valid_chunks: Option<&[IdType]>,
        mut new_valid_chunk: Option<&mut Vec<IdType>>,
    ) -> GraphResult<Vec<IdType>> {
        let info = &self.vertex_info;
        for label in labels {
            if !info.has_label(label) {
                return Err(GraphError::invalid(format!(
                    "label '{}' is not declared by vertex type '{}'",
                    label,
                    info.type_name()
                )));
            }
        }
        if let Some(chunks) = new_valid_chunk.as_deref_mut() {
            chunks.clear();
        }

        let chunk_size = info.chunk_size();
        let mut ids = Vec::new();
        for chunk in self.chunks_to_scan(valid_chunks) {
            let base = chunk * chunk_size;
            let before = ids.len();
            if labels.is_empty() {
                let rows = chunk_len(self.vertex_num, chunk_size, chunk);
                ids.extend((base..base + rows).filter(|id| self.selects(*id)));
            } else {
                let flags = self.store.read_vertex_labels(info, chunk, labels)?;
                let rows = flags.first().map(|f| f.len()).unwrap_or(0);
                for row in 0..rows {
                    let id = base + row as IdType;
                    if flags.iter().all(|f| f[row]) && self.selects(id) {
                        ids.push(id);
                    }
                }
            }
            if ids.len() > before {
                if let Some(chunks) = new_valid_chunk.as_deref_mut() {
                    chunks.push(chunk);
                }
            }
        }
        debug!(
            vertex_type = info.type_name(),
            labels = ?labels,
            matches = ids.len(),
            "label filter"
        );
        Ok(ids)
    }

    /// Ids of vertices for which `expr` holds, ascending
    ///
    /// `property` must be declared and is loaded alongside every property
    /// `expr` references. The expression is type-checked before any chunk is
    /// read.
    pub fn filter(
        &self,
        property: &str,
        expr: &Expression,
        valid_chunks: Option<&[IdType]>,
        mut new_valid_chunk: Option<&mut Vec<IdType>>,
    ) -> GraphResult<Vec<IdType>> {
        let info = &self.vertex_info;
        if !info.has_property(property) {
            return Err(GraphError::UnknownProperty(property.to_string()));
        }
        expr.check_predicate(info.as_ref())?;

        let mut names = expr.referenced_properties();
        if !names.iter().any(|n| n == property) {
            names.push(property.to_string());
        }
        if let Some(chunks) = new_valid_chunk.as_deref_mut() {
            chunks.clear();
        }

        let chunk_size = info.chunk_size();
        let mut ids = Vec::new();
        for chunk in self.chunks_to_scan(valid_chunks) {
            let columns = self.load_columns(&names, chunk)?;
            let rows = columns.values().next().map(|c| c.len()).unwrap_or(0);
            let matched = match self.filter_mode {
                FilterMode::Pushdown => {
                    let mut batch = ColumnBatch::new(rows);
                    for (name, column) in columns {
                        batch.insert(name, column)?;
                    }
                    let mask = expr.evaluate_batch(&batch)?;
                    (0..rows).filter(|i| mask.value(*i)).collect::<Vec<_>>()
                }
                FilterMode::RowWise => {
                    let mut matched = Vec::new();
                    for row in 0..rows {
                        let cells = ColumnRow {
                            columns: &columns,
                            row,
                        };
                        if expr.evaluate_predicate(&cells)? {
                            matched.push(row);
                        }
                    }
                    matched
                }
            };

            let before = ids.len();
            let base = chunk * chunk_size;
            ids.extend(
                matched
                    .into_iter()
                    .map(|row| base + row as IdType)
                    .filter(|id| self.selects(*id)),
            );
            if ids.len() > before {
                if let Some(chunks) = new_valid_chunk.as_deref_mut() {
                    chunks.push(chunk);
                }
            }
        }
        debug!(
            vertex_type = info.type_name(),
            filter = %expr,
            mode = %self.filter_mode,
            matches = ids.len(),
            "property filter"
        );
        Ok(ids)
    }

    fn load_columns(&self, names: &[String], chunk: IdType) -> GraphResult<HashMap<String, ArrayRef>> {
        let info = &self.vertex_info;
        let mut columns = HashMap::with_capacity(names.len());
        for name in names {
            let group = info
                .property_group(name)
                .ok_or_else(|| GraphError::UnknownProperty(name.clone()))?;
            let column = self.store.read_vertex_column(info, group, name, chunk)?;
            columns.insert(name.clone(), column);
        }
        Ok(columns)
    }
}

/// One row of a set of loaded chunk columns
struct ColumnRow<'a> {
    columns: &'a HashMap<String, ArrayRef>,
    row: usize,
}

impl Row for ColumnRow<'_> {
    fn value(&self, property: &str) -> GraphResult<Value> {
        let column = self
            .columns
            .get(property)
            .ok_or_else(|| GraphError::UnknownProperty(property.to_string()))?;
        value_at(column.as_ref(), self.row)
    }
}

/// Cursor over a `VerticesCollection`
///
/// Property groups are loaded on first access and kept until the cursor
/// moves to another chunk.
pub struct VertexIter<'a> {
    collection: &'a VerticesCollection,
    pos: usize,
    cache: RefCell<ChunkCache<IdType>>,
}

impl<'a> VertexIter<'a> {
    fn new(collection: &'a VerticesCollection, pos: usize) -> Self {
        Self {
            collection,
            pos,
            cache: RefCell::new(ChunkCache::new()),
        }
    }

    /// Id under the cursor; meaningless at the end position
    pub fn id(&self) -> IdType {
        if self.is_end() {
            return self.collection.vertex_num;
        }
        self.collection.id_at(self.pos)
    }

    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) {
        if !self.is_end() {
            self.pos += 1;
        }
    }

    pub fn is_end(&self) -> bool {
        self.pos >= self.collection.len()
    }

    fn current_chunk(&self) -> GraphResult<(IdType, usize)> {
        if self.is_end() {
            return Err(GraphError::invalid("vertex cursor is at the end"));
        }
        let chunk_size = self.collection.vertex_info.chunk_size();
        let id = self.id();
        Ok((id / chunk_size, (id % chunk_size) as usize))
    }

    /// Value of `property` for the current vertex
    pub fn value(&self, property: &str) -> GraphResult<Value> {
        let collection = self.collection;
        let info = &collection.vertex_info;
        let group_index = info
            .property_group_index(property)
            .ok_or_else(|| GraphError::UnknownProperty(property.to_string()))?;
        let group = info
            .property_group_by_index(group_index)
            .ok_or_else(|| GraphError::UnknownProperty(property.to_string()))?;
        let column = group
            .column_index(property)
            .ok_or_else(|| GraphError::UnknownProperty(property.to_string()))?;
        let (chunk, offset) = self.current_chunk()?;

        let batch = self.cache.borrow_mut().get_or_load(
            CacheSlot::Group(group_index),
            chunk,
            || collection.store.read_vertex_group(info, group, chunk),
        )?;
        value_at(batch.column(column).as_ref(), offset)
    }

    pub fn property<T: FromValue>(&self, property: &str) -> GraphResult<T> {
        T::from_value(self.value(property)?, property)
    }

    /// Whether `property` holds a non-null value
    pub fn is_valid(&self, property: &str) -> GraphResult<bool> {
        Ok(!self.value(property)?.is_null())
    }

    /// Declared labels the current vertex carries
    pub fn labels(&self) -> GraphResult<Vec<String>> {
        let collection = self.collection;
        let info = &collection.vertex_info;
        if info.labels().is_empty() {
            return Ok(Vec::new());
        }
        let (chunk, offset) = self.current_chunk()?;
        let batch = self
            .cache
            .borrow_mut()
            .get_or_load(CacheSlot::Labels, chunk, || {
                collection.store.read_vertex_label_batch(info, chunk)
            })?;

        let mut labels = Vec::new();
        for (label, column) in info.labels().iter().zip(batch.columns()) {
            if flag_values(column.as_ref())?.get(offset).copied().unwrap_or(false) {
                labels.push(label.clone());
            }
        }
        Ok(labels)
    }

    /// # Returns
    /// * `Err(GraphError::InvalidArgument)` for a label the type does not declare
    pub fn has_label(&self, label: &str) -> GraphResult<bool> {
        if !self.collection.vertex_info.has_label(label) {
            return Err(GraphError::invalid(format!(
                "label '{}' is not declared by vertex type '{}'",
                label,
                self.collection.vertex_info.type_name()
            )));
        }
        Ok(self.labels()?.iter().any(|l| l == label))
    }

    /// Materialize the current vertex with every property and label
    pub fn vertex(&self) -> GraphResult<VertexView> {
        let mut properties = HashMap::new();
        for property in self.collection.vertex_info.properties() {
            properties.insert(property.name.clone(), self.value(&property.name)?);
        }
        Ok(VertexView {
            id: self.id(),
            properties,
            labels: self.labels()?.into_iter().collect(),
        })
    }
}

impl Row for VertexIter<'_> {
    fn value(&self, property: &str) -> GraphResult<Value> {
        VertexIter::value(self, property)
    }
}

impl PartialEq for VertexIter<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.collection, other.collection) && self.pos == other.pos
    }
}

/// Read-only copy of one stored vertex
#[derive(Debug, Clone, PartialEq)]
pub struct VertexView {
    id: IdType,
    properties: HashMap<String, Value>,
    labels: BTreeSet<String>,
}

impl VertexView {
    pub fn id(&self) -> IdType {
        self.id
    }

    pub fn value(&self, property: &str) -> Option<&Value> {
        self.properties.get(property)
    }

    pub fn property<T: FromValue>(&self, property: &str) -> GraphResult<T> {
        let value = self
            .properties
            .get(property)
            .cloned()
            .ok_or_else(|| GraphError::UnknownProperty(property.to_string()))?;
        T::from_value(value, property)
    }

    pub fn properties(&self) -> &HashMap<String, Value> {
        &self.properties
    }

    pub fn labels(&self) -> &BTreeSet<String> {
        &self.labels
    }

    pub fn has_label(&self, label: &str) -> bool {
        self.labels.contains(label)
    }
}

impl Row for VertexView {
    fn value(&self, property: &str) -> GraphResult<Value> {
        self.properties.value(property)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::VerticesBuilder;
    use crate::expression::{and, eq, gt, lit, prop};
    use crate::info::{DataType, FileType, InfoVersion, Property, PropertyGroup};
    use crate::types::Vertex;
    use tempfile::TempDir;

    fn person() -> VertexInfo {
        let ages = PropertyGroup::new(
            vec![Property::simple("age", DataType::Int32, false)],
            FileType::Parquet,
            "",
        )
        .unwrap();
        let names = PropertyGroup::new(
            vec![Property::simple("name", DataType::String, false)],
            FileType::Csv,
            "",
        )
        .unwrap();
        VertexInfo::new(
            "person",
            2,
            vec![ages, names],
            vec!["a".into(), "b".into()],
            "",
            InfoVersion::default(),
        )
        .unwrap()
    }

    /// Five people, ages 10..50, labels alternating
    fn graph(dir: &TempDir) -> Arc<GraphInfo> {
        let prefix = format!("{}/", dir.path().display());
        let info = GraphInfo::new(
            "g",
            vec![person()],
            vec![],
            vec![],
            &prefix,
            InfoVersion::default(),
        )
        .unwrap();
        let mut builder = VerticesBuilder::new(person(), dir.path(), 0).unwrap();
        for i in 0..5 {
            let mut v = Vertex::new()
                .with_property("age", (i + 1) * 10)
                .with_property("name", format!("p{}", i))
                .with_label("a");
            if i % 2 == 0 {
                v.add_label("b");
            }
            builder.add_vertex(v).unwrap();
        }
        builder.dump().unwrap();
        Arc::new(info)
    }

    #[test]
    fn test_unknown_type() {
        let dir = TempDir::new().unwrap();
        let info = graph(&dir);
        assert!(matches!(
            VerticesCollection::make(&info, "company"),
            Err(GraphError::UnknownType(_))
        ));
    }

    #[test]
    fn test_iterate_and_find() {
        let dir = TempDir::new().unwrap();
        let info = graph(&dir);
        let vertices = VerticesCollection::make(&info, "person").unwrap();
        assert_eq!(vertices.len(), 5);

        let mut it = vertices.begin();
        let mut ages = Vec::new();
        while !it.is_end() {
            ages.push(it.property::<i32>("age").unwrap());
            it.next();
        }
        assert_eq!(ages, vec![10, 20, 30, 40, 50]);
        assert!(it == vertices.end());

        let it = vertices.find(3);
        assert_eq!(it.property::<String>("name").unwrap(), "p3");
        assert!(vertices.find(5) == vertices.end());
        assert!(vertices.find(-1).is_end());
    }

    #[test]
    fn test_cache_reuses_chunk() {
        let dir = TempDir::new().unwrap();
        let info = graph(&dir);
        let vertices = VerticesCollection::make(&info, "person").unwrap();
        let mut it = vertices.begin();
        it.value("age").unwrap();
        it.next();
        it.value("age").unwrap();
        assert_eq!(it.cache.borrow().loads(), 1);
        it.value("name").unwrap();
        assert_eq!(it.cache.borrow().loads(), 2);
        it.next();
        it.value("age").unwrap();
        assert_eq!(it.cache.borrow().chunk(), Some(1));
        assert_eq!(it.cache.borrow().len(), 1);
    }

    #[test]
    fn test_labels() {
        let dir = TempDir::new().unwrap();
        let info = graph(&dir);
        let vertices = VerticesCollection::make(&info, "person").unwrap();
        let mut chunks = Vec::new();
        let ids = vertices
            .filter_by_labels(&["a".into(), "b".into()], None, Some(&mut chunks))
            .unwrap();
        assert_eq!(ids, vec![0, 2, 4]);
        assert_eq!(chunks, vec![0, 1, 2]);

        let ids = vertices.filter_by_labels(&[], Some(&[2]), None).unwrap();
        assert_eq!(ids, vec![4]);

        assert!(matches!(
            vertices.filter_by_labels(&["z".into()], None, None),
            Err(GraphError::InvalidArgument(_))
        ));

        let it = vertices.find(1);
        assert_eq!(it.labels().unwrap(), vec!["a".to_string()]);
        assert!(!it.has_label("b").unwrap());
        let view = vertices.find(2).vertex().unwrap();
        assert!(view.has_label("b"));
        assert_eq!(view.property::<i32>("age").unwrap(), 30);
    }

    #[test]
    fn test_filter_modes_agree() {
        let dir = TempDir::new().unwrap();
        let info = graph(&dir);
        let expr = and(gt(prop("age"), lit(15_i64)), neq_name("p3"));
        for mode in [FilterMode::Pushdown, FilterMode::RowWise] {
            let vertices = VerticesCollection::make(&info, "person")
                .unwrap()
                .with_filter_mode(mode);
            let mut chunks = Vec::new();
            let ids = vertices
                .filter("age", &expr, None, Some(&mut chunks))
                .unwrap();
            assert_eq!(ids, vec![1, 2, 4]);
            assert_eq!(chunks, vec![0, 1, 2]);
        }
    }

    fn neq_name(name: &str) -> Expression {
        crate::expression::not(eq(prop("name"), lit(name)))
    }

    #[test]
    fn test_filter_errors() {
        let dir = TempDir::new().unwrap();
        let info = graph(&dir);
        let vertices = VerticesCollection::make(&info, "person").unwrap();
        assert!(matches!(
            vertices.filter("height", &gt(prop("age"), lit(1)), None, None),
            Err(GraphError::UnknownProperty(_))
        ));
        assert!(matches!(
            vertices.filter("age", &gt(prop("name"), lit(1)), None, None),
            Err(GraphError::TypeError(_))
        ));
    }

    #[test]
    fn test_selection_collections() {
        let dir = TempDir::new().unwrap();
        let info = graph(&dir);
        let labelled = VerticesCollection::with_label(&info, "person", "b").unwrap();
        assert_eq!(labelled.ids().collect::<Vec<_>>(), vec![0, 2, 4]);
        assert!(labelled.find(1).is_end());
        assert_eq!(labelled.find(4).property::<i32>("age").unwrap(), 50);

        // filters on a restricted collection stay inside the selection
        let ids = labelled
            .filter("age", &gt(prop("age"), lit(15)), None, None)
            .unwrap();
        assert_eq!(ids, vec![2, 4]);

        let filtered =
            VerticesCollection::with_property_filter(&info, "person", "age", &gt(prop("age"), lit(35)))
                .unwrap();
        assert_eq!(filtered.len(), 2);
        assert_eq!(filtered.begin().id(), 3);
    }
}
