use super::*;

fn doc(lines: &[&str]) -> String {
    let mut s = lines.join("\n");
    s.push('\n');
    s
}

#[test]
fn slidev_wrapper_with_inner_override() {
    let src = doc(&[
        "# Slide",
        "",
        "````shiki-magic-move {lines:true,startLine:5}",
        "```ts",
        "const a = 1",
        "```",
        "```ts {startLine:10}",
        "const a = 2",
        "```",
        "````",
    ]);
    let parsed = parse_document(&src);
    assert!(parsed.errors.is_empty(), "{:?}", parsed.errors);
    assert_eq!(parsed.blocks.len(), 1);

    let block = &parsed.blocks[0];
    assert_eq!(block.kind, BlockKind::SlidevStyle);
    assert_eq!(block.line, 3);
    assert!(block.is_usable());
    assert_eq!(block.steps.len(), 2);
    assert_eq!(
        block.steps[0].meta,
        StepMeta {
            show_line_numbers: true,
            start_line: 5
        }
    );
    assert_eq!(
        block.steps[1].meta,
        StepMeta {
            show_line_numbers: true,
            start_line: 10
        }
    );
    assert_eq!(block.steps[0].language, "ts");
    assert_eq!(block.steps[0].code, "const a = 1");
}

#[test]
fn markdown_wrapper_defaults() {
    let src = doc(&[
        "````md magic-move",
        "```rust",
        "fn main() {}",
        "```",
        "````",
    ]);
    let parsed = parse_document(&src);
    let block = &parsed.blocks[0];
    assert_eq!(block.kind, BlockKind::MarkdownStyle);
    assert_eq!(block.steps[0].meta, StepMeta::default());
}

#[test]
fn language_may_touch_the_annotation() {
    let src = doc(&[
        "````md magic-move",
        "```js{lines:true}",
        "x",
        "```",
        "````",
    ]);
    let step = &parse_document(&src).blocks[0].steps[0];
    assert_eq!(step.language, "js");
    assert!(step.meta.show_line_numbers);
}

#[test]
fn tilde_fences_are_equivalent() {
    let src = doc(&["~~~~md magic-move", "~~~py", "print(1)", "~~~", "~~~~"]);
    let parsed = parse_document(&src);
    assert_eq!(parsed.blocks.len(), 1);
    assert_eq!(parsed.blocks[0].steps[0].code, "print(1)");
}

#[test]
fn non_fence_content_between_steps_is_ignored() {
    let src = doc(&[
        "````md magic-move",
        "some prose",
        "```ts",
        "a",
        "```",
        "- a list item",
        "```ts",
        "b",
        "```",
        "````",
    ]);
    let block = &parse_document(&src).blocks[0];
    assert_eq!(block.steps.len(), 2);
    assert_eq!(block.steps[1].code, "b");
}

#[test]
fn multi_line_code_keeps_inner_newlines() {
    let src = doc(&[
        "````md magic-move",
        "```ts",
        "let a = 1",
        "",
        "let b = 2",
        "```",
        "````",
    ]);
    let step = &parse_document(&src).blocks[0].steps[0];
    assert_eq!(step.code, "let a = 1\n\nlet b = 2");
}

#[test]
fn plain_code_fences_and_other_wrappers_are_ignored() {
    let src = doc(&[
        "```ts",
        "outside",
        "```",
        "",
        "````md not-magic",
        "```ts",
        "x",
        "```",
        "````",
        "---",
    ]);
    let parsed = parse_document(&src);
    assert!(parsed.blocks.is_empty());
    assert_eq!(parsed.errors, vec![NO_BLOCKS_ERROR.to_owned()]);
}

#[test]
fn keyword_needs_a_boundary() {
    let src = doc(&["````shiki-magic-mover", "```ts", "x", "```", "````"]);
    assert!(parse_document(&src).blocks.is_empty());
    let src = doc(&["````mdmagic-move", "```ts", "x", "```", "````"]);
    assert!(parse_document(&src).blocks.is_empty());
}

#[test]
fn empty_block_reports_no_steps() {
    let src = doc(&["````md magic-move", "just text", "````"]);
    let parsed = parse_document(&src);
    assert!(parsed.errors.is_empty());
    assert_eq!(parsed.blocks.len(), 1);
    assert_eq!(parsed.blocks[0].errors, vec![NO_STEPS_ERROR.to_owned()]);
    assert!(!parsed.blocks[0].is_usable());
    assert_eq!(parsed.first_usable_block(), None);
}

#[test]
fn four_character_fences_inside_are_not_steps() {
    let src = doc(&[
        "````md magic-move",
        "~~~~ts",
        "wrapper-sized fence",
        "~~~~",
        "```ts",
        "real",
        "```",
        "````",
    ]);
    let block = &parse_document(&src).blocks[0];
    assert_eq!(block.steps.len(), 1);
    assert_eq!(block.steps[0].code, "real");
}

#[test]
fn wrapper_must_be_exactly_four_characters() {
    let src = doc(&["`````md magic-move", "```ts", "x", "```", "`````"]);
    let parsed = parse_document(&src);
    assert!(parsed.blocks.is_empty());
    assert_eq!(parsed.errors, vec![NO_BLOCKS_ERROR.to_owned()]);
}

#[test]
fn html_line_before_a_step_keeps_the_step() {
    let src = doc(&[
        "````md magic-move",
        "<div>note</div>",
        "```ts",
        "a",
        "```",
        "```ts",
        "b",
        "```",
        "````",
    ]);
    let parsed = parse_document(&src);
    let block = &parsed.blocks[0];
    assert!(block.errors.is_empty(), "{:?}", block.errors);
    assert_eq!(block.steps.len(), 2);
    assert_eq!(block.steps[0].code, "a");
    assert_eq!(block.steps[1].code, "b");
}

#[test]
fn html_line_before_a_wrapper_keeps_the_block() {
    let src = doc(&[
        "<div class=\"demo\">",
        "````md magic-move",
        "```ts",
        "a",
        "```",
        "````",
        "</div>",
    ]);
    let parsed = parse_document(&src);
    assert!(parsed.errors.is_empty(), "{:?}", parsed.errors);
    assert_eq!(parsed.blocks.len(), 1);
    assert_eq!(parsed.blocks[0].line, 2);
    assert_eq!(parsed.blocks[0].steps[0].code, "a");
}

#[test]
fn indented_fence_after_prose_is_a_step() {
    let src = doc(&[
        "````md magic-move",
        "intro line",
        "    ```ts",
        "    let a = 1",
        "      nested",
        "    ```",
        "````",
    ]);
    let step = &parse_document(&src).blocks[0].steps[0];
    assert_eq!(step.language, "ts");
    assert_eq!(step.code, "let a = 1\n  nested");
}

#[test]
fn backtick_info_with_backticks_is_not_a_fence() {
    let src = doc(&["````md magic-move", "```inline``` prose", "```ts", "a", "```", "````"]);
    let block = &parse_document(&src).blocks[0];
    assert_eq!(block.steps.len(), 1);
    assert_eq!(block.steps[0].code, "a");
}

#[test]
fn multiple_blocks_are_kept_in_order() {
    let src = doc(&[
        "````md magic-move",
        "```ts",
        "a",
        "```",
        "````",
        "",
        "---",
        "",
        "````shiki-magic-move {lines:true}",
        "```ts",
        "b",
        "```",
        "````",
    ]);
    let parsed = parse_document(&src);
    assert_eq!(parsed.blocks.len(), 2);
    assert_eq!(parsed.blocks[0].kind, BlockKind::MarkdownStyle);
    assert_eq!(parsed.blocks[1].kind, BlockKind::SlidevStyle);
    assert!(parsed.blocks[1].steps[0].meta.show_line_numbers);
    assert_eq!(parsed.first_usable_block(), Some(0));
}

#[test]
fn unclosed_wrapper_is_reported() {
    let src = doc(&["````md magic-move", "```ts", "a", "```"]);
    let parsed = parse_document(&src);
    assert!(parsed.blocks.is_empty());
    assert_eq!(parsed.errors.len(), 2);
    assert!(parsed.errors[0].contains("line 1"));
    assert_eq!(parsed.errors[1], NO_BLOCKS_ERROR);
}

#[test]
fn unclosed_wrapper_after_a_good_block_keeps_the_block() {
    let src = doc(&[
        "````md magic-move",
        "```ts",
        "a",
        "```",
        "````",
        "````md magic-move",
        "```ts",
        "b",
    ]);
    let parsed = parse_document(&src);
    assert_eq!(parsed.blocks.len(), 1);
    assert_eq!(parsed.errors.len(), 1);
    assert!(parsed.errors[0].contains("line 6"));
}

#[test]
fn empty_document_reports_missing_blocks() {
    let parsed = parse_document("");
    assert!(parsed.blocks.is_empty());
    assert_eq!(parsed.errors.len(), 1);
}
