impl<R: Record> RecordCollection<R> {
    /// Invokes `method` with `args` on every member, collecting the return values
    /// in collection order.
    ///
    /// Stops at the first member that fails and returns its error.
    pub fn forward_to_all(&mut self, method: &str, args: &[Value]) -> Result<Vec<Value>> {
        event!(
            Level::DEBUG,
            method,
            members = self.records.len(),
            "forwarding call to collection members"
        );

        let mut results = Vec::with_capacity(self.records.len());
        for record in &mut self.records {
            results.push(record.invoke(method, args)?);
        }
        Ok(results)
    }

    /// Returns how many members advertise each method name.
    pub fn methods_catalog(&self) -> HashMap<String, usize> {
        let mut counts = HashMap::new();
        for record in &self.records {
            for method in record.methods() {
                *counts.entry(method.name).or_insert(0) += 1;
            }
        }
        counts
    }
}
