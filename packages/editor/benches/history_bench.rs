use carbon_editor::{Cursor, Document, Editor, EditorConfig, Paragraph};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn editor(paragraphs: usize) -> Editor {
    let mut doc = Document::new().with_section("body");
    for i in 0..paragraphs {
        doc.insert_component(
            "body",
            i,
            Box::new(Paragraph::with_text(format!("p{i}"), "Lorem ipsum dolor sit amet")),
        )
        .unwrap();
    }
    let config = EditorConfig {
        max_undo_levels: 0,
        id_seed: Some("bench".to_string()),
        ..EditorConfig::default()
    };
    Editor::with_config(doc, &config)
}

fn type_and_undo(c: &mut Criterion) {
    c.bench_function("type_100_chars_then_undo", |b| {
        b.iter(|| {
            let mut editor = editor(10);
            editor.click("p5", 0);
            for _ in 0..100 {
                editor.type_text(black_box("x")).unwrap();
            }
            while editor.undo().unwrap() {}
            editor
        })
    });
}

fn delete_selection_and_undo(c: &mut Criterion) {
    c.bench_function("delete_across_200_paragraphs_then_undo", |b| {
        b.iter(|| {
            let mut editor = editor(200);
            editor.select(Cursor::new("p0", 3), Cursor::new("p199", 3));
            editor.delete_selection().unwrap();
            editor.undo().unwrap();
            editor
        })
    });
}

fn paste_links(c: &mut Criterion) {
    c.bench_function("paste_youtube_links", |b| {
        b.iter(|| {
            let mut editor = editor(1);
            editor.click("p0", 0);
            for _ in 0..50 {
                editor
                    .paste(black_box("https://www.youtube.com/watch?v=abc12345678"))
                    .unwrap();
            }
            editor
        })
    });
}

criterion_group!(benches, type_and_undo, delete_selection_and_undo, paste_links);
criterion_main!(benches);
