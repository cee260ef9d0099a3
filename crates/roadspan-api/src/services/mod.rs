mod resolve;

pub use resolve::ResolveService;
