#[cfg(test)]
pub mod test {
    use crate::field::{Bool, Int, Str};
    use crate::schema::Schema;
    use crate::value::Value;

    /// Schema mirroring a small web app: host/port/debug plus a nested
    /// database section with a nullable url.
    pub fn app_schema() -> Schema {
        Schema::builder()
            .field("host", Str::new().default("localhost"))
            .field("port", Int::new().default(8080))
            .field("debug", Bool::new().default(false))
            .nested("database", db_schema())
            .build()
            .expect("fixture schema must build")
    }

    pub fn db_schema() -> Schema {
        Schema::builder()
            .field("url", Str::new().default(Value::Null))
            .field("pool_size", Int::new().default(5))
            .build()
            .expect("fixture schema must build")
    }

    #[test]
    fn fixture_loads_defaults() {
        let config = crate::config::Config::builder(app_schema()).build().unwrap();
        assert_eq!(config.get_as::<String>("host").unwrap(), "localhost");
        assert_eq!(config.get_as::<u16>("port").unwrap(), 8080);
        assert!(!config.get_as::<bool>("debug").unwrap());
        assert_eq!(config.get_as::<Option<String>>("database.url").unwrap(), None);
        assert_eq!(config.get_as::<i64>("database.pool_size").unwrap(), 5);
    }
}
