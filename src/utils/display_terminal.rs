//! 터미널 출력 포맷팅 유틸리티
//!
//! 서비스 레지스트리 초기화 과정을 터미널에 시각적으로 표시합니다.

/// 박스 형태로 둘러싸인 제목을 출력합니다
///
/// ```text
/// ╔══════════════════════════════════════════════════╗
/// ║         🔄 INITIALIZING SERVICE REGISTRY         ║
/// ╚══════════════════════════════════════════════════╝
/// ```
pub fn print_boxed_title(title: &str) {
    println!("{}", boxed_title(title));
}

/// 박스 제목 문자열을 만듭니다 (내부 폭 50칸, 가운데 정렬)
pub fn boxed_title(title: &str) -> String {
    let content_width = 50;
    let border = "═".repeat(content_width);
    format!(
        "╔{}╗\n║{:^width$}║\n╚{}╝",
        border,
        title,
        border,
        width = content_width
    )
}

/// 진행 단계 시작을 표시합니다
///
/// ```text
/// → Step 1: Initializing components
/// ```
pub fn print_step_start(step: u8, description: &str) {
    println!("→ Step {}: {}", step, description);
}

/// 진행 단계 완료를 처리된 항목 수와 함께 표시합니다
pub fn print_step_complete(step: u8, description: &str, count: usize) {
    println!("✓ Step {}: {} ({} items)", step, description, count);
}

/// 서브 작업의 상태를 표시합니다
///
/// ```text
///    ├─ books cache: ✓ Ready
/// ```
pub fn print_sub_task(name: &str, status: &str) {
    println!("   ├─ {}: {}", name, status);
}

/// 레지스트리 초기화 완료 요약을 출력합니다
pub fn print_final_summary(components: usize, instances: usize) {
    println!();
    print_boxed_title("🎉 SERVICE REGISTRY INITIALIZED");
    println!("   ♻️  Lifecycle components: {}", components);
    println!("   📦 Registered instances: {}", instances);
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boxed_title_has_three_lines() {
        let rendered = boxed_title("READY");
        let lines: Vec<&str> = rendered.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with('╔'));
        assert!(lines[1].contains("READY"));
        assert!(lines[2].ends_with('╝'));
    }

    #[test]
    fn test_boxed_title_edges_line_up() {
        let rendered = boxed_title("SERVICE REGISTRY INITIALIZED");
        let widths: Vec<usize> = rendered.lines().map(|line| line.chars().count()).collect();

        assert_eq!(widths, vec![52, 52, 52]);
    }
}
