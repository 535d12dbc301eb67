use polystore::database::{SqlColumn, SqlColumnType};
use polystore::errors::ErrorKind;
use polystore::{Database, DatabaseConfig, PropertiesDocument};
use polystore_int_test::test_util::{
    cleanup, create_players_table, create_sqlite_context, run_on_all_backends, run_test,
};
use polystore_sql_adapter::SqliteDatabase;

#[ctor::ctor]
fn init() {
    colog::init();
}

#[test]
fn test_connect_twice_is_a_state_error() {
    run_on_all_backends(|ctx| {
        let db = ctx.db();
        assert!(db.is_connected());
        let err = db.connect().unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::ConnectionState, "{}", ctx.backend());
        Ok(())
    });
}

#[test]
fn test_operations_after_disconnect_fail_fast() {
    run_on_all_backends(|ctx| {
        let db = ctx.db();
        create_players_table(&db)?;
        db.disconnect()?;
        assert!(!db.is_connected());

        let kinds = [
            db.query("players").execute().map(|_| ()),
            db.insert("players").set("uuid", "x").execute(),
            db.update("players").set("coins", 1).execute(),
            db.delete("players").execute(),
            db.insert_or_update("players").where_eq("uuid", "x").set("coins", 1).execute(),
            db.list_tables().map(|_| ()),
            db.disconnect(),
        ];
        for result in kinds {
            assert_eq!(
                result.unwrap_err().kind(),
                &ErrorKind::ConnectionState,
                "{}",
                ctx.backend()
            );
        }
        Ok(())
    });
}

#[test]
fn test_reconnect_after_disconnect() {
    run_on_all_backends(|ctx| {
        let db = ctx.db();
        create_players_table(&db)?;
        db.insert("players").set("uuid", "kept").execute()?;
        db.disconnect()?;

        db.connect()?;
        let rows = db.query("players").where_eq("uuid", "kept").execute()?;
        assert_eq!(rows.size(), 1, "{}", ctx.backend());
        Ok(())
    });
}

#[test]
fn test_create_if_not_exists_twice_leaves_one_table() {
    run_on_all_backends(|ctx| {
        let db = ctx.db();
        create_players_table(&db)?;
        create_players_table(&db)?;
        db.create_table_if_not_exists(
            "audit",
            &[SqlColumn::new("message", SqlColumnType::LongText)],
        )?;

        let tables = db.list_tables()?;
        assert_eq!(
            tables,
            vec!["audit".to_string(), "players".to_string()],
            "{}",
            ctx.backend()
        );
        Ok(())
    });
}

#[test]
fn test_non_numeric_column_parameter_is_rejected() {
    run_on_all_backends(|ctx| {
        let db = ctx.db();
        let err = db
            .create_table_if_not_exists(
                "audit",
                &[SqlColumn::new("message", SqlColumnType::Varchar).with_param("8); DROP TABLE x; --")],
            )
            .unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::InvalidOperation, "{}", ctx.backend());
        assert!(db.list_tables()?.is_empty(), "{}", ctx.backend());
        Ok(())
    });
}

#[test]
fn test_empty_update_is_a_no_op() {
    run_on_all_backends(|ctx| {
        let db = ctx.db();
        create_players_table(&db)?;
        db.insert("players").set("uuid", "u-1").set("coins", 3).execute()?;

        db.update("players").where_eq("uuid", "u-1").execute()?;
        let rows = db.query("players").execute()?;
        assert_eq!(rows.first_or_empty().get_i64("coins"), 3, "{}", ctx.backend());
        Ok(())
    });
}

#[test]
fn test_sqlite_connects_from_properties_file() {
    run_test(
        create_sqlite_context,
        |ctx| {
            let db = ctx.db();
            create_players_table(&db)?;
            db.insert("players").set("uuid", "u-1").set("name", "Ärger").execute()?;

            let mut properties = PropertiesDocument::new();
            properties.set("file", ctx.path().unwrap_or_default())?;
            let properties_path = format!("{}.properties", ctx.path().unwrap_or_default());
            properties.save(&properties_path)?;

            let loaded = PropertiesDocument::load(&properties_path)?;
            std::fs::remove_file(&properties_path)?;
            let config = DatabaseConfig::from_properties(&loaded)?;
            assert_eq!(config.file(), ctx.path());

            let second = Database::new(SqliteDatabase::new(), config);
            second.connect()?;
            let rows = second.query("players").where_eq("uuid", "u-1").execute()?;
            assert_eq!(rows.first_or_empty().get_string("name"), Some("Ärger".to_string()));
            second.disconnect()
        },
        cleanup,
    );
}
