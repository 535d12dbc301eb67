/// Generates the `where_*` and `filter` methods shared by every builder
/// that carries filters. `$spec` names the builder's spec field.
macro_rules! filter_methods {
    ($spec:ident) => {
        /// Matches records whose `field_name` equals `value` exactly.
        pub fn where_eq<T: Into<$crate::common::Value>>(
            &mut self,
            field_name: &str,
            value: T,
        ) -> &mut Self {
            self.filter($crate::filter::field(field_name).eq(value))
        }

        /// Matches a string field, ignoring case when `ignore_case` is set.
        pub fn where_ignore_case(
            &mut self,
            field_name: &str,
            value: &str,
            ignore_case: bool,
        ) -> &mut Self {
            self.filter($crate::filter::field(field_name).string_eq(value, ignore_case))
        }

        pub fn where_not<T: Into<$crate::common::Value>>(
            &mut self,
            field_name: &str,
            value: T,
        ) -> &mut Self {
            self.filter($crate::filter::field(field_name).ne(value))
        }

        /// Adds a filter, replacing any earlier filter on the same field.
        pub fn filter(&mut self, filter: $crate::filter::Filter) -> &mut Self {
            $crate::database::operation::put_filter(self.$spec.filters_mut(), filter);
            self
        }
    };
}

/// Generates the `set` method of builders that carry new values.
macro_rules! assignment_methods {
    ($spec:ident, $values:ident) => {
        /// Assigns `value` to `field_name`. A later assignment to the same
        /// field wins.
        pub fn set<T: Into<$crate::common::Value>>(&mut self, field_name: &str, value: T) -> &mut Self {
            self.$spec
                .$values()
                .insert(field_name.to_string(), value.into());
            self
        }
    };
}
