use super::cache::{CacheSlot, ChunkCache};
use crate::error::{GraphError, GraphResult};
use crate::expression::Row;
use crate::info::{AdjListType, AlignedBy, EdgeInfo, GraphInfo};
use crate::storage::arrow_convert::value_at;
use crate::storage::ChunkStore;
use crate::types::{chunk_count, FromValue, IdType, Value};
use arrow::record_batch::RecordBatch;
use std::cell::RefCell;
use std::collections::HashMap;
use std::ops::Range;
use std::sync::Arc;
use tracing::debug;

/// Cursor position: (vertex chunk, offset inside that chunk's part)
type Position = (IdType, IdType);

/// Edges of one triple in one adjacency representation
///
/// Covers the parts of a range of aligned vertex chunks. Per-part edge
/// counts are read once at construction.
pub struct EdgesCollection {
    graph_info: Arc<GraphInfo>,
    edge_info: Arc<EdgeInfo>,
    store: ChunkStore,
    adj_type: AdjListType,
    chunk_begin: IdType,
    chunk_end: IdType,
    edge_counts: Vec<IdType>,
    edge_num: IdType,
}

impl EdgesCollection {
    /// Edges of `src_type -edge_type-> dst_type` stored as `adj_type`
    ///
    /// `vertex_chunks` restricts the collection to the parts of those
    /// aligned vertex chunks; it is clamped to the chunks that exist.
    ///
    /// # Returns
    /// * `Err(GraphError::UnknownType)` if the triple is not in the graph
    /// * `Err(GraphError::InvalidArgument)` if the edge type lacks
    ///   `adj_type` or the range is empty or negative
    pub fn make(
        graph_info: &Arc<GraphInfo>,
        src_type: &str,
        edge_type: &str,
        dst_type: &str,
        adj_type: AdjListType,
        vertex_chunks: Option<Range<IdType>>,
    ) -> GraphResult<Self> {
        let edge_info = graph_info
            .edge_info(src_type, edge_type, dst_type)
            .cloned()
            .ok_or_else(|| {
                GraphError::UnknownType(format!("{}_{}_{}", src_type, edge_type, dst_type))
            })?;
        if !edge_info.has_adjacent_list_type(adj_type) {
            return Err(GraphError::invalid(format!(
                "edge type '{}' has no {} adjacency list",
                edge_info.concat_key(),
                adj_type
            )));
        }
        if let Some(range) = &vertex_chunks {
            if range.start < 0 || range.start >= range.end {
                return Err(GraphError::invalid(format!(
                    "invalid vertex chunk range {}..{}",
                    range.start, range.end
                )));
            }
        }

        let store = ChunkStore::for_graph(graph_info)?;
        let vertex_num = match store.read_vertex_count(&edge_info, adj_type) {
            Ok(n) => n,
            Err(GraphError::NotFound(_)) => 0,
            Err(e) => return Err(e),
        };
        let chunk_num = chunk_count(vertex_num, edge_info.aligned_chunk_size(adj_type));
        let (chunk_begin, chunk_end) = match vertex_chunks {
            Some(range) => (range.start.min(chunk_num), range.end.min(chunk_num)),
            None => (0, chunk_num),
        };
        let edge_counts = (chunk_begin..chunk_end)
            .map(|chunk| store.read_edge_count(&edge_info, adj_type, chunk))
            .collect::<GraphResult<Vec<_>>>()?;
        let edge_num = edge_counts.iter().sum();
        debug!(
            edge_type = %edge_info.concat_key(),
            adj_list = %adj_type,
            chunk_begin,
            chunk_end,
            edge_num,
            "opened edges collection"
        );

        Ok(Self {
            graph_info: graph_info.clone(),
            edge_info,
            store,
            adj_type,
            chunk_begin,
            chunk_end,
            edge_counts,
            edge_num,
        })
    }

    pub fn graph_info(&self) -> &Arc<GraphInfo> {
        &self.graph_info
    }

    pub fn edge_info(&self) -> &Arc<EdgeInfo> {
        &self.edge_info
    }

    pub fn adj_type(&self) -> AdjListType {
        self.adj_type
    }

    /// Aligned vertex chunks covered, after clamping
    pub fn vertex_chunk_range(&self) -> Range<IdType> {
        self.chunk_begin..self.chunk_end
    }

    pub fn len(&self) -> usize {
        self.edge_num as usize
    }

    pub fn is_empty(&self) -> bool {
        self.edge_num == 0
    }

    fn part_len(&self, vertex_chunk: IdType) -> IdType {
        if vertex_chunk < self.chunk_begin || vertex_chunk >= self.chunk_end {
            return 0;
        }
        self.edge_counts[(vertex_chunk - self.chunk_begin) as usize]
    }

    fn at(&self, position: Position) -> EdgeIter<'_> {
        let mut iter = EdgeIter {
            collection: self,
            vertex_chunk: position.0,
            offset: position.1,
            cache: RefCell::new(ChunkCache::new()),
        };
        iter.skip_exhausted_parts();
        iter
    }

    pub fn begin(&self) -> EdgeIter<'_> {
        self.at((self.chunk_begin, 0))
    }

    pub fn end(&self) -> EdgeIter<'_> {
        self.at((self.chunk_end, 0))
    }

    /// First edge at or after `from` whose source is `id`, or `end()`
    pub fn find_src(&self, id: IdType, from: &EdgeIter<'_>) -> GraphResult<EdgeIter<'_>> {
        self.find(AlignedBy::Src, id, from.position())
    }

    /// First edge at or after `from` whose destination is `id`, or `end()`
    pub fn find_dst(&self, id: IdType, from: &EdgeIter<'_>) -> GraphResult<EdgeIter<'_>> {
        self.find(AlignedBy::Dst, id, from.position())
    }

    fn find(&self, endpoint: AlignedBy, id: IdType, from: Position) -> GraphResult<EdgeIter<'_>> {
        if endpoint != self.adj_type.aligned_by() {
            return self.scan(endpoint, id, self.at(from), None);
        }

        let vertex_chunk_size = self.edge_info.aligned_chunk_size(self.adj_type);
        let part = id / vertex_chunk_size;
        if id < 0 || part < self.chunk_begin || part >= self.chunk_end {
            return Ok(self.end());
        }
        if !self.adj_type.is_ordered() {
            let start = from.max((part, 0));
            return self.scan(endpoint, id, self.at(start), Some(part));
        }

        // ordered: the offsets give the exact run of `id` inside its part
        let offsets = self
            .store
            .read_offsets(&self.edge_info, self.adj_type, part)?;
        let local = (id % vertex_chunk_size) as usize;
        let (start, stop) = match (offsets.get(local), offsets.get(local + 1)) {
            (Some(start), Some(stop)) => (*start, *stop),
            _ => return Ok(self.end()),
        };
        if start == stop {
            return Ok(self.end());
        }
        let position = if from <= (part, start) {
            (part, start)
        } else if from < (part, stop) {
            from
        } else {
            return Ok(self.end());
        };
        Ok(self.at(position))
    }

    /// Step `iter` forward until its `endpoint` is `id`, optionally staying
    /// inside one part
    fn scan<'a>(
        &'a self,
        endpoint: AlignedBy,
        id: IdType,
        mut iter: EdgeIter<'a>,
        part: Option<IdType>,
    ) -> GraphResult<EdgeIter<'a>> {
        while !iter.is_end() && part.map_or(true, |p| iter.vertex_chunk == p) {
            if iter.endpoint(endpoint)? == id {
                return Ok(iter);
            }
            iter.next();
        }
        Ok(self.end())
    }
}

/// Cursor over an `EdgesCollection`
///
/// The adjacency and property chunks under the cursor are cached until it
/// moves to another edge chunk.
pub struct EdgeIter<'a> {
    collection: &'a EdgesCollection,
    vertex_chunk: IdType,
    offset: IdType,
    cache: RefCell<ChunkCache<(IdType, IdType)>>,
}

impl<'a> EdgeIter<'a> {
    fn position(&self) -> Position {
        (self.vertex_chunk, self.offset)
    }

    fn skip_exhausted_parts(&mut self) {
        let collection = self.collection;
        if self.vertex_chunk < collection.chunk_begin {
            self.vertex_chunk = collection.chunk_begin;
            self.offset = 0;
        }
        while self.vertex_chunk < collection.chunk_end
            && self.offset >= collection.part_len(self.vertex_chunk)
        {
            self.vertex_chunk += 1;
            self.offset = 0;
        }
        if self.vertex_chunk >= collection.chunk_end {
            self.vertex_chunk = collection.chunk_end;
            self.offset = 0;
        }
    }

    fn to_end(&mut self) {
        self.vertex_chunk = self.collection.chunk_end;
        self.offset = 0;
    }

    pub fn is_end(&self) -> bool {
        self.vertex_chunk >= self.collection.chunk_end
    }

    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) {
        if !self.is_end() {
            self.offset += 1;
            self.skip_exhausted_parts();
        }
    }

    pub fn to_begin(&mut self) {
        self.vertex_chunk = self.collection.chunk_begin;
        self.offset = 0;
        self.skip_exhausted_parts();
    }

    /// Aligned vertex chunk whose part holds the current edge
    pub fn vertex_chunk_index(&self) -> IdType {
        self.vertex_chunk
    }

    /// Offset of the current edge inside its part
    pub fn cur_offset(&self) -> IdType {
        self.offset
    }

    /// Index of the current edge chunk counted over the whole collection
    pub fn global_chunk_index(&self) -> IdType {
        let collection = self.collection;
        let chunk_size = collection.edge_info.chunk_size();
        let before: IdType = (collection.chunk_begin..self.vertex_chunk)
            .map(|c| chunk_count(collection.part_len(c), chunk_size))
            .sum();
        before + self.offset / chunk_size
    }

    fn edge_chunk(&self) -> GraphResult<(IdType, usize)> {
        if self.is_end() {
            return Err(GraphError::invalid("edge cursor is at the end"));
        }
        let chunk_size = self.collection.edge_info.chunk_size();
        Ok((self.offset / chunk_size, (self.offset % chunk_size) as usize))
    }

    fn load(&self, slot: CacheSlot, edge_chunk: IdType) -> GraphResult<RecordBatch> {
        let collection = self.collection;
        let info = &collection.edge_info;
        let adj_type = collection.adj_type;
        let vertex_chunk = self.vertex_chunk;
        self.cache
            .borrow_mut()
            .get_or_load(slot, (vertex_chunk, edge_chunk), || match slot {
                CacheSlot::Group(index) => {
                    let group = info.property_group_by_index(index).ok_or_else(|| {
                        GraphError::invalid(format!("no property group {}", index))
                    })?;
                    collection
                        .store
                        .read_edge_group(info, adj_type, group, vertex_chunk, edge_chunk)
                }
                CacheSlot::Adjacency | CacheSlot::Labels => collection
                    .store
                    .read_adjacency_batch(info, adj_type, vertex_chunk, edge_chunk),
            })
    }

    fn endpoint(&self, endpoint: AlignedBy) -> GraphResult<IdType> {
        let (edge_chunk, row) = self.edge_chunk()?;
        let batch = self.load(CacheSlot::Adjacency, edge_chunk)?;
        let column = match endpoint {
            AlignedBy::Src => 0,
            AlignedBy::Dst => 1,
        };
        match value_at(batch.column(column).as_ref(), row)? {
            Value::Int64(id) => Ok(id),
            other => Err(GraphError::type_error(format!(
                "adjacency column holds {}",
                other.type_name()
            ))),
        }
    }

    pub fn source(&self) -> GraphResult<IdType> {
        self.endpoint(AlignedBy::Src)
    }

    pub fn destination(&self) -> GraphResult<IdType> {
        self.endpoint(AlignedBy::Dst)
    }

    pub fn value(&self, property: &str) -> GraphResult<Value> {
        let info = &self.collection.edge_info;
        let group_index = info
            .property_group_index(property)
            .ok_or_else(|| GraphError::UnknownProperty(property.to_string()))?;
        let column = info
            .property_group_by_index(group_index)
            .and_then(|g| g.column_index(property))
            .ok_or_else(|| GraphError::UnknownProperty(property.to_string()))?;
        let (edge_chunk, row) = self.edge_chunk()?;
        let batch = self.load(CacheSlot::Group(group_index), edge_chunk)?;
        value_at(batch.column(column).as_ref(), row)
    }

    pub fn property<T: FromValue>(&self, property: &str) -> GraphResult<T> {
        T::from_value(self.value(property)?, property)
    }

    /// Materialize the current edge with every property
    pub fn edge(&self) -> GraphResult<EdgeView> {
        let mut properties = HashMap::new();
        for property in self.collection.edge_info.properties() {
            properties.insert(property.name.clone(), self.value(&property.name)?);
        }
        Ok(EdgeView {
            src: self.source()?,
            dst: self.destination()?,
            properties,
        })
    }

    fn next_same(&mut self, endpoint: AlignedBy) -> GraphResult<bool> {
        if self.is_end() {
            return Ok(false);
        }
        let current = self.endpoint(endpoint)?;
        let part = self.vertex_chunk;
        let adj_type = self.collection.adj_type;
        self.next();
        if adj_type.is_ordered() && adj_type.aligned_by() == endpoint {
            return Ok(!self.is_end() && self.endpoint(endpoint)? == current);
        }
        // unordered: the run may be interleaved, search the rest of the part
        while !self.is_end() && self.vertex_chunk == part {
            if self.endpoint(endpoint)? == current {
                return Ok(true);
            }
            self.next();
        }
        Ok(false)
    }

    /// Move to the next edge with the same source
    ///
    /// Returns false once the source's edges in the current vertex chunk are
    /// exhausted; the cursor then rests on the first edge past them.
    pub fn next_src(&mut self) -> GraphResult<bool> {
        self.next_same(AlignedBy::Src)
    }

    /// Move to the next edge with the same destination
    pub fn next_dst(&mut self) -> GraphResult<bool> {
        self.next_same(AlignedBy::Dst)
    }

    fn next_with(&mut self, endpoint: AlignedBy, id: IdType) -> GraphResult<bool> {
        if self.is_end() {
            return Ok(false);
        }
        let adj_type = self.collection.adj_type;
        let aligned = adj_type.aligned_by() == endpoint;
        let part = id / self.collection.edge_info.aligned_chunk_size(adj_type);
        self.next();
        while !self.is_end() {
            if aligned && self.vertex_chunk > part {
                break;
            }
            let current = self.endpoint(endpoint)?;
            if current == id {
                return Ok(true);
            }
            // sorted by this endpoint: no later edge can match
            if aligned && adj_type.is_ordered() && current > id {
                break;
            }
            self.next();
        }
        self.to_end();
        Ok(false)
    }

    /// Step, then skip forward to the next edge whose source is `id`
    ///
    /// Returns whether one was found; the cursor is at the end otherwise.
    pub fn next_src_with(&mut self, id: IdType) -> GraphResult<bool> {
        self.next_with(AlignedBy::Src, id)
    }

    /// Step, then skip forward to the next edge whose destination is `id`
    pub fn next_dst_with(&mut self, id: IdType) -> GraphResult<bool> {
        self.next_with(AlignedBy::Dst, id)
    }
}

impl Row for EdgeIter<'_> {
    fn value(&self, property: &str) -> GraphResult<Value> {
        EdgeIter::value(self, property)
    }
}

impl PartialEq for EdgeIter<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.collection, other.collection) && self.position() == other.position()
    }
}

/// Read-only copy of one stored edge
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeView {
    src: IdType,
    dst: IdType,
    properties: HashMap<String, Value>,
}

impl EdgeView {
    pub fn src(&self) -> IdType {
        self.src
    }

    pub fn dst(&self) -> IdType {
        self.dst
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
}

impl Row for EdgeView {
    fn value(&self, property: &str) -> GraphResult<Value> {
        self.properties.value(property)
    }
}
