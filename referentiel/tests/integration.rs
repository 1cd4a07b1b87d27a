//! Tests d'intégration sur des fichiers de référentiel

use std::path::{Path, PathBuf};

use referentiel::{
    load_table, parse_selection, LoadOptions, MalformedPolicy, PrKey, ReferentielError,
};

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

#[test]
fn test_load_all_fixtures() {
    let pattern = format!("{}/tests/fixtures/*.csv", env!("CARGO_MANIFEST_DIR"));
    let fixtures: Vec<PathBuf> = glob::glob(&pattern)
        .unwrap()
        .filter_map(|entry| entry.ok())
        .collect();

    assert!(!fixtures.is_empty(), "Should find CSV fixtures");

    for path in &fixtures {
        let table = load_table(path, &LoadOptions::default())
            .unwrap_or_else(|e| panic!("Failed to load {}: {}", path.display(), e));

        assert!(!table.is_empty(), "{} should contain PR", path.display());
        for pr in table.points() {
            assert!(!pr.code_ci.is_empty());
            assert!(pr.x.is_finite() && pr.y.is_finite());
            // Emprise Lambert-93 métropole
            assert!(pr.x > 0.0 && pr.x < 1_300_000.0, "x={}", pr.x);
            assert!(pr.y > 6_000_000.0 && pr.y < 7_200_000.0, "y={}", pr.y);
        }
    }
}

#[test]
fn test_quoted_fixture_values_are_cleaned() {
    let table = load_table(&fixture("referentiel_sample.csv"), &LoadOptions::default()).unwrap();

    assert_eq!(table.len(), 6);
    let first = &table.points()[0];
    assert_eq!(first.code_ci, "597120");
    assert_eq!(first.code_ch, "BA");
    assert_eq!(first.libelle, "Site historique d'Argenton-sur-Creuse");
    assert_eq!(first.x, 593412.38);
    assert_eq!(first.y, 6607214.71);
}

#[test]
fn test_semicolon_fixture_is_trimmed() {
    let table =
        load_table(&fixture("referentiel_semicolon.csv"), &LoadOptions::default()).unwrap();

    assert_eq!(table.len(), 2);
    assert_eq!(table.points()[0].code_ci, "100001");
    assert_eq!(table.points()[0].libelle, "Pont de la Garonne");
    assert_eq!(table.points()[1].libelle, "Viaduc; rive gauche");
    assert_eq!(table.points()[1].x, 418003.5);
}

#[test]
fn test_find_with_both_codes_returns_loaded_duplicates() {
    let table = load_table(&fixture("referentiel_sample.csv"), &LoadOptions::default()).unwrap();

    let expected: Vec<_> = table
        .points()
        .iter()
        .filter(|pr| pr.code_ci == "597120" && pr.code_ch == "BA")
        .collect();
    let found = table.find(Some("597120"), Some("BA"));

    assert_eq!(found, expected);
    assert_eq!(found.len(), 2);
    assert!(found[1].libelle.contains("doublon"));
}

#[test]
fn test_selection_against_fixture() {
    let table = load_table(&fixture("referentiel_sample.csv"), &LoadOptions::default()).unwrap();
    let parsed = parse_selection("142091-AO;Monument\n999999-ZZ\nnot a code\n393314-BV");

    let selection = table.select(&parsed.request.pairs);

    assert_eq!(parsed.rejected.len(), 1);
    assert_eq!(selection.points.len(), 2);
    assert_eq!(selection.points[0].libelle, "Monument de Langres");
    assert_eq!(selection.missing, vec![PrKey::new("999999", "ZZ")]);
}

#[test]
fn test_malformed_policies() {
    let path = std::env::temp_dir().join("referentiel_integration_policies.csv");
    std::fs::write(
        &path,
        "codeCI,codeCH,libelleCI,XLambert93,YLambert93\n\
         1,A,Pont,652381,6862047\n\
         2,B,Gare,n/a,6862047\n\
         3,C,Eglise,652500,6862100\n",
    )
    .unwrap();

    // Abort: aucun PR
    let err = load_table(&path, &LoadOptions::default()).unwrap_err();
    assert!(matches!(err, ReferentielError::MalformedRow { line: 3, .. }));

    // Skip: lignes valides conservées
    let options = LoadOptions::default().with_policy(MalformedPolicy::Skip);
    let table = load_table(&path, &options).unwrap();
    assert_eq!(table.len(), 2);
    assert_eq!(table.skipped().len(), 1);
    assert_eq!(table.skipped()[0].line, 3);

    std::fs::remove_file(path).ok();
}
