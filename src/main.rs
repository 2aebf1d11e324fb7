fn main() {
    match diffy::cli::run() {
        Ok(code) => std::process::exit(code.as_i32()),
        Err(err) => {
            diffy::ui::eprintln_error(&err);
            std::process::exit(diffy::exit::exit_code(&err));
        }
    }
}
