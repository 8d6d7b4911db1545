use ruri::Router;

fn main() -> ruri::Result<()> {
    let mut router = Router::new();
    router.insert("/", "home")?;
    router.insert("/users/{id}", "user profile")?;
    router.insert("/users/me", "own profile")?;
    router.insert("/files/{path+}", "file server")?;
    router.insert("/wiki/{page*}", "wiki")?;

    for path in [
        "/",
        "/users/42",
        "/users/me",
        "/files/reports/2024/q3.pdf",
        "/wiki",
        "/wiki/Main_Page",
        "/nowhere",
    ] {
        match router.find(path) {
            Ok(m) => {
                print!("{path} -> {}", m.value);
                for (id, value) in m.params.iter() {
                    print!("  {{{id}}}={value:?}");
                }
                println!();
            }
            Err(e) => println!("{path} -> {e}"),
        }
    }

    Ok(())
}
