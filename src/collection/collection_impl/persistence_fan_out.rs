type MemberOp<R> = fn(&mut R) -> Result<bool>;

impl<R: Record> RecordCollection<R> {
    /// Saves every member. Member failures are not reported; always returns `true`.
    pub fn save(&mut self) -> bool {
        self.fan_out("save", R::save)
    }

    /// Deletes every member. Member failures are not reported; always returns `true`.
    pub fn delete(&mut self) -> bool {
        self.fan_out("delete", R::delete)
    }

    /// Refreshes every member. Member failures are not reported; always returns `true`.
    pub fn refresh(&mut self) -> bool {
        self.fan_out("refresh", R::refresh)
    }

    /// Saves every member and reports each member's outcome.
    ///
    /// Honors the configured [`FailurePolicy`].
    pub fn save_each(&mut self) -> BulkOutcome {
        self.fan_out_strict("save", R::save)
    }

    /// Deletes every member and reports each member's outcome.
    pub fn delete_each(&mut self) -> BulkOutcome {
        self.fan_out_strict("delete", R::delete)
    }

    /// Refreshes every member and reports each member's outcome.
    pub fn refresh_each(&mut self) -> BulkOutcome {
        self.fan_out_strict("refresh", R::refresh)
    }

    fn fan_out(&mut self, operation: &'static str, op: MemberOp<R>) -> bool {
        let label = self.config.display_label();
        let span = info_span!(
            "collection.fan_out",
            collection = %label,
            operation,
            members = self.records.len()
        );
        let _enter = span.enter();

        for (index, record) in self.records.iter_mut().enumerate() {
            let failure = match op(record) {
                Ok(true) => continue,
                Ok(false) => "member reported false".to_string(),
                Err(err) => err.to_string(),
            };
            if self.config.log_member_failures {
                warn!(
                    "{} ignored member failure: collection='{}' index={} error='{}'",
                    operation, label, index, failure
                );
            }
        }

        event!(Level::DEBUG, "collection fan-out finished");
        true
    }

    fn fan_out_strict(&mut self, operation: &'static str, op: MemberOp<R>) -> BulkOutcome {
        let span = info_span!(
            "collection.fan_out_strict",
            collection = %self.config.display_label(),
            operation,
            members = self.records.len()
        );
        let _enter = span.enter();

        let stop_on_failure = self.config.failure_policy == FailurePolicy::StopOnFirstFailure;
        let mut outcome = BulkOutcome::new(operation, self.records.len());

        for (index, record) in self.records.iter_mut().enumerate() {
            let member = MemberOutcome {
                index,
                result: op(record),
            };
            let failed = !member.succeeded();
            outcome.outcomes.push(member);
            if failed && stop_on_failure {
                event!(Level::DEBUG, index, "collection fan-out stopped on failure");
                break;
            }
        }

        outcome
    }
}
