// tests for mutation classification

use sqlguard::{Category, classify, detect_mutating_keywords};

#[test]
fn test_plain_select_has_no_labels() {
    assert!(detect_mutating_keywords("SELECT * FROM t").is_empty());
    assert!(detect_mutating_keywords("").is_empty());
}

#[test]
fn test_create_table_golden() {
    assert_eq!(
        detect_mutating_keywords("CREATE TABLE foo (id INT)"),
        vec!["DDL", "CREATE"]
    );
}

#[test]
fn test_case_insensitive() {
    assert_eq!(
        detect_mutating_keywords("create table t (x int)"),
        detect_mutating_keywords("CREATE TABLE T (X INT)")
    );
}

#[test]
fn test_word_boundaries() {
    assert!(detect_mutating_keywords("SELECT created_at FROM t").is_empty());
    assert!(detect_mutating_keywords("SELECT updated, dropped FROM t").is_empty());
}

#[test]
fn test_leading_whitespace_before_category() {
    assert_eq!(
        detect_mutating_keywords("  \n\t GRANT SELECT ON db.* TO bob"),
        vec!["PERMISSION", "GRANT"]
    );
}

#[test]
fn test_user_and_role_are_ddl_and_permission() {
    assert_eq!(
        detect_mutating_keywords("CREATE USER bob"),
        vec!["DDL", "PERMISSION", "CREATE"]
    );
    assert_eq!(
        detect_mutating_keywords("DROP ROLE admin"),
        vec!["DDL", "PERMISSION", "DROP"]
    );
}

#[test]
fn test_alter_index_is_not_ddl() {
    assert_eq!(
        detect_mutating_keywords("ALTER INDEX idx RENAME TO idx2"),
        vec!["ALTER", "RENAME"]
    );
}

#[test]
fn test_truncate() {
    assert_eq!(detect_mutating_keywords("TRUNCATE users"), vec!["DDL", "TRUNCATE"]);
}

#[test]
fn test_system_statements() {
    for sql in [
        "SET GLOBAL max_connections = 10",
        "SET SESSION sql_mode = ''",
        "RESET MASTER",
        "FLUSH PRIVILEGES",
        "CHANGE MASTER TO MASTER_HOST='h'",
        "STOP SLAVE",
        "PURGE BINARY LOGS BEFORE '2024-01-01'",
        "USE analytics",
        "SET autocommit = 0",
        "SELECT a INTO OUTFILE '/tmp/x' FROM t",
        "SET GTID_PURGED = ''",
        "START SLAVE",
        "RESET PERSIST",
    ] {
        assert_eq!(detect_mutating_keywords(sql), vec!["SYSTEM"], "{sql}");
    }
}

#[test]
fn test_plugins() {
    assert_eq!(
        detect_mutating_keywords("INSTALL PLUGIN audit SONAME 'audit.so'"),
        vec!["SYSTEM", "INSTALL PLUGIN"]
    );
    let labels = detect_mutating_keywords("UNINSTALL PLUGIN audit");
    assert_eq!(labels, vec!["SYSTEM", "UNINSTALL PLUGIN"]);
    assert!(!labels.contains(&"INSTALL PLUGIN".to_string()));
}

#[test]
fn test_load_xml_is_keyword_only() {
    assert_eq!(
        detect_mutating_keywords("LOAD XML INFILE 'x.xml' INTO TABLE t"),
        vec!["LOAD XML"]
    );
}

#[test]
fn test_rename_table_and_user() {
    assert_eq!(detect_mutating_keywords("RENAME TABLE a TO b"), vec!["DDL", "RENAME"]);
    assert_eq!(
        detect_mutating_keywords("RENAME USER bob TO alice"),
        vec!["PERMISSION", "RENAME"]
    );
}

#[test]
fn test_permission_forms() {
    assert_eq!(
        detect_mutating_keywords("ALTER USER bob IDENTIFIED BY 'x'"),
        vec!["DDL", "PERMISSION", "ALTER"]
    );
    assert_eq!(
        detect_mutating_keywords("SET DEFAULT ROLE admin TO bob"),
        vec!["PERMISSION"]
    );
    assert_eq!(
        detect_mutating_keywords("REVOKE ROLE admin FROM bob"),
        vec!["PERMISSION", "REVOKE"]
    );
}

#[test]
fn test_flush_needs_a_target() {
    assert!(detect_mutating_keywords("FLUSH").is_empty());
    assert!(detect_mutating_keywords("FLUSH ").is_empty());
    assert_eq!(detect_mutating_keywords("FLUSH QUERY CACHE"), vec!["SYSTEM"]);
}

#[test]
fn test_outfile_select_stays_on_one_line() {
    assert!(detect_mutating_keywords("SELECT a,\nb INTO OUTFILE '/tmp/x' FROM t").is_empty());
}

#[test]
fn test_copy_is_system_and_keyword() {
    assert_eq!(
        detect_mutating_keywords("COPY users TO '/tmp/users.csv'"),
        vec!["SYSTEM", "COPY"]
    );
}

#[test]
fn test_load_data_infile() {
    assert_eq!(
        detect_mutating_keywords("load data infile '/tmp/x' into table t"),
        vec!["SYSTEM", "LOAD DATA"]
    );
}

#[test]
fn test_transaction_control() {
    for sql in [
        "BEGIN",
        "BEGIN TRANSACTION READ ONLY",
        "COMMIT",
        "ROLLBACK TRANSACTION",
        "SAVEPOINT sp1",
        "RELEASE SAVEPOINT sp1",
        "START TRANSACTION",
    ] {
        assert_eq!(
            detect_mutating_keywords(sql),
            vec!["TRANSACTION_CONTROL"],
            "{sql}"
        );
    }
}

#[test]
fn test_keywords_deduplicated_and_sorted() {
    let sql = "INSERT INTO t VALUES (1); insert into t VALUES (2); UPDATE t SET x = 1";
    assert_eq!(detect_mutating_keywords(sql), vec!["INSERT", "UPDATE"]);
}

#[test]
fn test_keyword_scan_is_lexical() {
    // function names and comments count too
    assert_eq!(
        detect_mutating_keywords("SELECT REPLACE(name, 'a', 'b') FROM t"),
        vec!["REPLACE"]
    );
    assert_eq!(detect_mutating_keywords("SELECT 1 -- CREATE"), vec!["CREATE"]);
}

#[test]
fn test_merge_and_upsert() {
    assert_eq!(
        detect_mutating_keywords("MERGE INTO t USING s ON t.id = s.id"),
        vec!["MERGE"]
    );
    assert_eq!(detect_mutating_keywords("upsert into t values (1)"), vec!["UPSERT"]);
}

#[test]
fn test_typed_classification() {
    let c = classify("DROP TABLE t");
    assert!(c.has(Category::Ddl));
    assert!(!c.has(Category::Permission));
    assert_eq!(c.keywords, vec!["DROP"]);
    assert!(classify("SELECT 1").is_empty());
}

#[test]
fn test_idempotent() {
    let sql = "CREATE USER bob; GRANT ALL ON *.* TO bob";
    assert_eq!(detect_mutating_keywords(sql), detect_mutating_keywords(sql));
}
