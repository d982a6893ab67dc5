use super::*;

fn usage_names(text: &str) -> Vec<String> {
    find_usages(text).into_iter().map(|u| u.name).collect()
}

fn token_at<'a>(
    text: &'a str,
    usage: &UsageOccurrence,
) -> &'a str {
    &text[usage.range.clone()]
}

#[test]
fn finds_definition_with_line_from_preceding_newlines() {
    let text = "FactoryBot.define do\n  factory :user do\n    name { 'John' }\n  end\nend\n";
    let defs = find_definitions(text);
    assert_eq!(defs.len(), 1);
    assert_eq!(defs[0].name, "user");
    assert_eq!(line_of_offset(text, defs[0].offset), 1);
}

#[test]
fn definitions_are_reported_in_document_order_without_dedup() {
    let text = "factory :user do\nend\nfactory :post do\nend\nfactory :user do\nend";
    let defs = find_definitions(text);
    let names: Vec<&str> = defs.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(names, vec!["user", "post", "user"]);
    let lines: Vec<u32> = defs.iter().map(|d| line_of_offset(text, d.offset)).collect();
    assert_eq!(lines, vec![0, 2, 4]);
}

#[test]
fn definition_is_not_anchored_to_line_start() {
    let defs = find_definitions("x = 1; factory :admin_user, class: 'User' do");
    assert_eq!(defs.len(), 1);
    assert_eq!(defs[0].name, "admin_user");
    assert_eq!(defs[0].offset, 7);
}

#[test]
fn definition_accepts_parenthesised_form() {
    let defs = find_definitions("factory(:comment) do\nend");
    assert_eq!(defs.len(), 1);
    assert_eq!(defs[0].name, "comment");
}

#[test]
fn definition_whitespace_does_not_cross_lines() {
    assert!(find_definitions("factory\n:user").is_empty());
}

#[test]
fn definition_requires_symbol_argument() {
    assert!(find_definitions("factory 'user' do\nend").is_empty());
    assert!(find_definitions("factory_bot :user").is_empty());
}

#[test]
fn usage_range_covers_only_symbol_token() {
    for text in ["create(:user)", "create :user", "build(:user)", "build :user", "create( :user )"] {
        let usages = find_usages(text);
        assert_eq!(usages.len(), 1, "expected one usage in {text:?}");
        assert_eq!(usages[0].name, "user");
        assert_eq!(token_at(text, &usages[0]), ":user", "range in {text:?}");
    }
}

#[test]
fn usage_with_trailing_keyword_arguments() {
    let text = "let(:user) { create(:user, name: 'John', admin: true) }";
    let usages = find_usages(text);
    assert_eq!(usages.len(), 1);
    assert_eq!(usages[0].name, "user");
    assert_eq!(token_at(text, &usages[0]), ":user");
    assert_eq!(usages[0].range, 20..25);
}

#[test]
fn usage_without_parens_and_trailing_arguments() {
    let text = "post = build :post, title: 'Test'\n";
    let usages = find_usages(text);
    assert_eq!(usages.len(), 1);
    assert_eq!(token_at(text, &usages[0]), ":post");
}

#[test]
fn usages_across_lines_in_document_order() {
    let text = "create(:user)\nbuild(:post)";
    let usages = find_usages(text);
    assert_eq!(usage_names(text), vec!["user", "post"]);
    assert_eq!(usages[0].range, 7..12);
    assert_eq!(usages[1].range, 20..25);
}

#[test]
fn repeated_usages_are_not_deduplicated() {
    assert_eq!(usage_names("create(:user); create(:user)"), vec!["user", "user"]);
}

#[test]
fn multiple_usages_on_one_line() {
    let text = "[create(:user), build(:post, title: 'x')]";
    assert_eq!(usage_names(text), vec!["user", "post"]);
}

#[test]
fn unparenthesised_call_with_nested_call_in_arguments() {
    let text = "create :user, owner: build(:post)";
    assert_eq!(usage_names(text), vec!["user", "post"]);
}

#[test]
fn nested_call_inside_parenthesised_arguments() {
    let text = "create(:comment, post: build(:post))";
    let usages = find_usages(text);
    assert_eq!(usage_names(text), vec!["comment", "post"]);
    assert_eq!(token_at(text, &usages[1]), ":post");
    assert_eq!(usages[1].range, 29..34);
}

#[test]
fn usage_split_across_lines() {
    let text = "create(\n  :user,\n  name: 'x'\n)";
    let usages = find_usages(text);
    assert_eq!(usage_names(text), vec!["user"]);
    assert_eq!(token_at(text, &usages[0]), ":user");
    assert_eq!(line_of_offset(text, usages[0].range.start), 1);

    assert_eq!(usage_names("build\n  :post"), vec!["post"]);
}

#[test]
fn usage_matches_inside_comments_and_strings() {
    assert_eq!(usage_names("# create(:user)"), vec!["user"]);
    assert_eq!(usage_names("puts \"build :post\""), vec!["post"]);
}

#[test]
fn usage_keyword_is_not_word_bounded() {
    assert_eq!(usage_names("rebuild(:cache)"), vec!["cache"]);
}

#[test]
fn non_symbol_arguments_are_ignored() {
    assert!(find_usages("create(user)").is_empty());
    assert!(find_usages("build('post')").is_empty());
    assert!(find_usages("create_list(:user, 3)").is_empty());
}

#[test]
fn usage_at_resolves_cursor_inside_and_at_token_end() {
    let text = "create(:user)\nbuild(:post)";
    assert_eq!(usage_at(text, 7).map(|u| u.name), Some("user".to_string()));
    assert_eq!(usage_at(text, 12).map(|u| u.name), Some("user".to_string()));
    assert_eq!(usage_at(text, 22).map(|u| u.name), Some("post".to_string()));
    assert!(usage_at(text, 2).is_none());
}

#[test]
fn line_of_offset_clamps_past_end() {
    assert_eq!(line_of_offset("a\nb\n", 100), 2);
    assert_eq!(line_of_offset("", 0), 0);
}
