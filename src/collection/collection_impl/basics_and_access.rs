impl<R: Record> RecordCollection<R> {
    /// Creates a collection over `records`, reading schema metadata from `exemplar`.
    ///
    /// Members are not checked against the exemplar's schema. A mismatched member
    /// only shows up when an attribute or relation it lacks is accessed.
    pub fn new<I>(exemplar: R, records: I) -> Self
    where
        I: IntoIterator<Item = R>,
    {
        Self::with_config(exemplar, records, CollectionConfig::default())
    }

    /// Factory alias for [`RecordCollection::new`].
    pub fn create<I>(exemplar: R, records: I) -> Self
    where
        I: IntoIterator<Item = R>,
    {
        Self::new(exemplar, records)
    }

    /// Creates a collection with an explicit configuration.
    pub fn with_config<I>(exemplar: R, records: I, config: CollectionConfig) -> Self
    where
        I: IntoIterator<Item = R>,
    {
        let attribute_names = exemplar.attribute_names();
        let relations = exemplar.relations();
        Self {
            exemplar,
            records: records.into_iter().collect(),
            attribute_names,
            relations,
            config,
        }
    }

    /// Returns the exemplar record the schema snapshot was taken from.
    pub fn model(&self) -> &R {
        &self.exemplar
    }

    pub fn type_name(&self) -> &str {
        self.exemplar.type_name()
    }

    /// Attribute names captured at construction.
    pub fn attribute_names(&self) -> &BTreeSet<String> {
        &self.attribute_names
    }

    /// Relations captured at construction.
    pub fn relations(&self) -> &BTreeMap<String, RelationDef> {
        &self.relations
    }

    pub fn config(&self) -> &CollectionConfig {
        &self.config
    }

    /// Returns the number of members.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if the collection has no members.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&R> {
        self.records.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut R> {
        self.records.get_mut(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, R> {
        self.records.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, R> {
        self.records.iter_mut()
    }

    /// Returns the members as a slice.
    pub fn records(&self) -> &[R] {
        &self.records
    }

    /// Consumes the collection and returns its members.
    pub fn into_records(self) -> Vec<R> {
        self.records
    }

    /// Replaces the member at `index`, returning the previous one.
    pub fn replace(&mut self, index: usize, record: R) -> Result<R> {
        let len = self.records.len();
        let slot = self
            .records
            .get_mut(index)
            .ok_or(DbError::IndexOutOfBounds { index, len })?;
        Ok(std::mem::replace(slot, record))
    }

    /// Returns the first member, if any.
    pub fn first(&self) -> Option<&R> {
        self.records.first()
    }

    /// Returns the last member, if any.
    pub fn last(&self) -> Option<&R> {
        self.records.last()
    }

    /// Builds a new collection of the members matching `predicate`.
    ///
    /// The result shares this collection's exemplar, schema snapshot and
    /// configuration. Relative order is preserved.
    pub fn filter<F>(&self, predicate: F) -> Self
    where
        R: Clone,
        F: Fn(&R) -> bool,
    {
        Self {
            exemplar: self.exemplar.clone(),
            records: self
                .records
                .iter()
                .filter(|record| predicate(record))
                .cloned()
                .collect(),
            attribute_names: self.attribute_names.clone(),
            relations: self.relations.clone(),
            config: self.config.clone(),
        }
    }

    /// Calls `callback` once per member, in order.
    pub fn apply<F>(&mut self, mut callback: F)
    where
        F: FnMut(&mut R),
    {
        for record in &mut self.records {
            callback(record);
        }
    }
}
