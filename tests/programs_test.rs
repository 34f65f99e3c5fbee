mod common;

use cert_crawl::config::{BrowserConfig, ProgramsConfig};
use cert_crawl::core::programs::{ProgramScraper, Visit};
use cert_crawl::domain::model::{Link, UniversityRow};
use cert_crawl::{CrawlError, HttpBrowser, JobEngine, LocalStorage, ProgramsJob};
use common::{link, ScriptedBrowser};
use httpmock::prelude::*;
use std::time::Duration;
use tempfile::TempDir;

fn row(name: &str, url: &str) -> UniversityRow {
    UniversityRow {
        name: name.to_string(),
        url: url.to_string(),
    }
}

fn scraper(browser: ScriptedBrowser) -> ProgramScraper<ScriptedBrowser> {
    ProgramScraper::new(browser, ProgramsConfig::default(), Duration::from_millis(1))
}

fn campus() -> ScriptedBrowser {
    ScriptedBrowser::new()
        .page(
            "https://uni-a.mx/",
            vec![
                link("Contacto", "https://uni-a.mx/contacto"),
                link("Oferta Académica", "https://uni-a.mx/oferta"),
                link("Programas de estudio", "https://uni-a.mx/otros"),
            ],
        )
        .page(
            "https://uni-a.mx/oferta",
            vec![
                link("Licenciatura en Derecho", "https://uni-a.mx/lic"),
                link("Maestría en Ciencias", "https://uni-a.mx/mc"),
                Link::new("Doctorado (próximamente)", None),
                link("DOCTORADO EN FÍSICA", "https://uni-a.mx/df"),
            ],
        )
        .page(
            "https://uni-b.mx/",
            vec![link("Noticias", "https://uni-b.mx/noticias")],
        )
        .page(
            "https://uni-c.mx/",
            vec![
                Link::new("Oferta educativa", None),
                link("Programas", "https://uni-c.mx/programas"),
            ],
        )
        .page(
            "https://uni-d.mx/",
            vec![link("Estudios", "https://uni-d.mx/estudios")],
        )
        .page(
            "https://uni-d.mx/estudios",
            vec![link("Licenciaturas", "https://uni-d.mx/lic")],
        )
}

#[tokio::test]
async fn test_visit_collects_program_links() {
    let mut scraper = scraper(campus());

    let visit = scraper.visit(&row("Uni A", "https://uni-a.mx/")).await.unwrap();

    let Visit::Programs(programs) = visit else {
        panic!("expected programs");
    };
    let found: Vec<(&str, &str)> = programs
        .iter()
        .map(|p| (p.program_name.as_str(), p.program_url.as_str()))
        .collect();
    assert_eq!(
        found,
        vec![
            ("Maestría en Ciencias", "https://uni-a.mx/mc"),
            ("DOCTORADO EN FÍSICA", "https://uni-a.mx/df"),
        ]
    );
    assert!(programs.iter().all(|p| p.university_name == "Uni A"));
}

#[tokio::test]
async fn test_visit_outcomes_without_programs() {
    let mut scraper = scraper(campus());

    assert_eq!(
        scraper.visit(&row("Uni B", "https://uni-b.mx/")).await.unwrap(),
        Visit::NoOfferSection
    );
    // First offer match has no href; later matches are not tried.
    assert_eq!(
        scraper.visit(&row("Uni C", "https://uni-c.mx/")).await.unwrap(),
        Visit::NoOfferSection
    );
    assert_eq!(
        scraper.visit(&row("Uni D", "https://uni-d.mx/")).await.unwrap(),
        Visit::NoPrograms {
            offer_url: "https://uni-d.mx/estudios".to_string()
        }
    );
    assert!(matches!(
        scraper.visit(&row("Uni E", "https://uni-e.mx/")).await,
        Err(CrawlError::NavigationError { .. })
    ));
}

#[tokio::test]
async fn test_every_university_is_resolved_or_listed() {
    let universities = vec![
        row("Uni A", "https://uni-a.mx/"),
        row("Uni B", "https://uni-b.mx/"),
        row("Uni E", "https://uni-e.mx/"),
        row("Uni C", "https://uni-c.mx/"),
        row("Uni D", "https://uni-d.mx/"),
    ];
    let mut scraper = scraper(campus());

    let report = scraper.crawl(&universities).await;

    assert_eq!(report.programs.len(), 2);
    let unresolved: Vec<&str> = report
        .unresolved
        .iter()
        .map(|u| u.university_name.as_str())
        .collect();
    assert_eq!(unresolved, vec!["Uni B", "Uni E", "Uni C", "Uni D"]);
}

#[tokio::test]
async fn test_missing_input_table_aborts_and_quits() {
    let temp_dir = TempDir::new().unwrap();
    let browser = campus();
    let job = ProgramsJob::new(
        browser.clone(),
        LocalStorage::new(temp_dir.path()),
        ProgramsConfig::default(),
        Duration::from_millis(1),
    );

    let err = JobEngine::new(job).run().await.unwrap_err();

    assert!(matches!(err, CrawlError::IoError(_)));
    assert!(browser.visited().is_empty());
    assert_eq!(browser.quit_count(), 1);
}

#[tokio::test]
async fn test_job_writes_both_tables() {
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(
        temp_dir.path().join("universidades_mexico_limpio.csv"),
        "category,name,url\n\
         Universidades-Publicas,Uni A,https://uni-a.mx/\n\
         Universidades-Publicas,Uni B,https://uni-b.mx/\n",
    )
    .unwrap();
    let browser = campus();
    let job = ProgramsJob::new(
        browser.clone(),
        LocalStorage::new(temp_dir.path()),
        ProgramsConfig::default(),
        Duration::from_millis(1),
    );

    let summary = JobEngine::new(job).run().await.unwrap();

    assert_eq!(summary.records, 2);
    assert_eq!(
        summary.outputs,
        vec![
            "maestrias_especializaciones_mexico.csv",
            "universidades_sin_maestrias.csv"
        ]
    );
    assert_eq!(browser.quit_count(), 1);

    let programs = std::fs::read_to_string(
        temp_dir
            .path()
            .join("maestrias_especializaciones_mexico.csv"),
    )
    .unwrap();
    assert_eq!(
        programs,
        "university_name,university_url,program_name,program_url\n\
         Uni A,https://uni-a.mx/,Maestría en Ciencias,https://uni-a.mx/mc\n\
         Uni A,https://uni-a.mx/,DOCTORADO EN FÍSICA,https://uni-a.mx/df\n"
    );
    let unresolved =
        std::fs::read_to_string(temp_dir.path().join("universidades_sin_maestrias.csv")).unwrap();
    assert_eq!(
        unresolved,
        "university_name,university_url\nUni B,https://uni-b.mx/\n"
    );
}

#[tokio::test]
async fn test_crawl_over_http() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/uni-a");
            then.status(200)
                .header("content-type", "text/html; charset=utf-8")
                .body(
                    r#"<html><body><nav>
                    <a href="/uni-a/contacto">Contacto</a>
                    <a href="oferta">  Oferta
                        Académica </a>
                    </nav></body></html>"#,
                );
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/oferta");
            then.status(200)
                .header("content-type", "text/html; charset=utf-8")
                .body(
                    r#"<html><body><ul>
                    <li><a href="/posgrado/especializacion-redes">Especialización en Redes</a></li>
                    <li><a href="/lic/derecho">Licenciatura en Derecho</a></li>
                    </ul></body></html>"#,
                );
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/uni-b");
            then.status(404);
        })
        .await;

    let temp_dir = TempDir::new().unwrap();
    let table = format!(
        "category,name,url\nPublicas,Uni A,{}\nPublicas,Uni B,{}\n",
        server.url("/uni-a"),
        server.url("/uni-b")
    );
    std::fs::write(temp_dir.path().join("universidades.csv"), table).unwrap();

    let config = ProgramsConfig {
        input_file: "universidades.csv".to_string(),
        page_wait_secs: 0,
        ..ProgramsConfig::default()
    };
    let job = ProgramsJob::new(
        HttpBrowser::new(&BrowserConfig::default()).unwrap(),
        LocalStorage::new(temp_dir.path()),
        config,
        Duration::from_millis(1),
    );

    let summary = JobEngine::new(job).run().await.unwrap();
    assert_eq!(summary.records, 1);

    let programs = std::fs::read_to_string(
        temp_dir
            .path()
            .join("maestrias_especializaciones_mexico.csv"),
    )
    .unwrap();
    assert_eq!(
        programs,
        format!(
            "university_name,university_url,program_name,program_url\n\
             Uni A,{},Especialización en Redes,{}\n",
            server.url("/uni-a"),
            server.url("/posgrado/especializacion-redes")
        )
    );
    let unresolved =
        std::fs::read_to_string(temp_dir.path().join("universidades_sin_maestrias.csv")).unwrap();
    assert_eq!(
        unresolved,
        format!("university_name,university_url\nUni B,{}\n", server.url("/uni-b"))
    );
}
