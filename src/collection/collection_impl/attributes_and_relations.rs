impl<R: Record> RecordCollection<R> {
    /// Returns `true` if `name` is one of the captured attribute names.
    pub fn has_attribute(&self, name: &str) -> bool {
        self.attribute_names.contains(name)
    }

    /// Returns `true` if `name` is one of the captured relations.
    pub fn has_relation(&self, name: &str) -> bool {
        self.relations.contains_key(name)
    }

    /// Returns every member's full attribute map, in collection order.
    pub fn get_attributes(&self) -> Vec<Attributes> {
        self.records.iter().map(|record| record.attributes()).collect()
    }

    /// Returns the value of `name` from every member, in collection order.
    pub fn get_attribute(&self, name: &str) -> Vec<Value> {
        self.records
            .iter()
            .map(|record| record.get_attribute(name))
            .collect()
    }

    /// Writes `value` to attribute `name` on every member.
    ///
    /// Unknown attribute names are ignored. Nothing is persisted until `save`.
    ///
    /// Not atomic: when a member rejects the write, the members before it keep
    /// the new value and the ones after it are left untouched.
    pub fn set_attribute(&mut self, name: &str, value: impl Into<Value>) -> Result<()> {
        if !self.has_attribute(name) {
            return Ok(());
        }

        let value = value.into();
        for record in &mut self.records {
            record.set_attribute(name, value.clone())?;
        }
        Ok(())
    }

    /// Resolves relation `name` on every member, in collection order.
    ///
    /// Returns an empty list when `name` is not a known relation.
    pub fn get_related(
        &mut self,
        name: &str,
        refresh: bool,
        params: &RelationParams,
    ) -> Result<Vec<Related>> {
        if !self.has_relation(name) {
            return Ok(Vec::new());
        }

        let mut related = Vec::with_capacity(self.records.len());
        for record in &mut self.records {
            related.push(record.get_related(name, refresh, params)?);
        }
        Ok(related)
    }

    /// Shorthand for `get_related(name, false, &RelationParams::default())`.
    pub fn related(&mut self, name: &str) -> Result<Vec<Related>> {
        self.get_related(name, false, &RelationParams::default())
    }

    /// Reads a property by name.
    ///
    /// Attributes take precedence over relations. Unknown names yield
    /// [`Property::Empty`].
    pub fn get_property(&mut self, name: &str) -> Result<Property> {
        if self.has_attribute(name) {
            return Ok(Property::Attributes(self.get_attribute(name)));
        }
        if self.has_relation(name) {
            return Ok(Property::Related(self.related(name)?));
        }
        Ok(Property::Empty)
    }

    /// Writes a property by name. Always routed to [`RecordCollection::set_attribute`].
    pub fn set_property(&mut self, name: &str, value: impl Into<Value>) -> Result<()> {
        self.set_attribute(name, value)
    }
}
